//! Programs, uniforms and introspection against the recording driver.

use std::rc::Rc;

use webgl_core::constants::*;
use webgl_core::{CallArg, JsValue, RecordingDriver, RenderingContext, TypedArray, WebGLObject};

fn setup() -> (RenderingContext, RecordingDriver) {
    let driver = RecordingDriver::new();
    let ctx = RenderingContext::with_driver(driver.clone());
    (ctx, driver)
}

fn get_error(ctx: &mut RenderingContext) -> u32 {
    match ctx.call("getError", &[]).unwrap() {
        JsValue::Number(code) => code as u32,
        other => panic!("getError returned {:?}", other),
    }
}

fn num(value: u32) -> JsValue {
    JsValue::from(value)
}

fn native_id(value: &JsValue) -> u32 {
    WebGLObject::from_js(value).unwrap().webgl_id()
}

fn floats(value: &[f32]) -> JsValue {
    TypedArray::from_slice(value).into()
}

/// A linked program in use, with the given uniforms declared on the driver.
fn program_with(
    ctx: &mut RenderingContext,
    driver: &RecordingDriver,
    uniforms: &[(&str, u32, i32)],
) -> (JsValue, u32) {
    let program = ctx.call("createProgram", &[]).unwrap();
    let id = native_id(&program);
    for (name, type_, size) in uniforms {
        driver.add_uniform(id, name, *type_, *size);
    }
    ctx.call("linkProgram", &[program.clone()]).unwrap();
    ctx.call("useProgram", &[program.clone()]).unwrap();
    (program, id)
}

fn location(ctx: &mut RenderingContext, program: &JsValue, name: &str) -> JsValue {
    ctx.call("getUniformLocation", &[program.clone(), name.into()])
        .unwrap()
}

// ==================== Uniform setters ====================

#[test]
fn test_uniform_scalar_setter() {
    let (mut ctx, driver) = setup();
    let (program, id) = program_with(&mut ctx, &driver, &[("color", FLOAT_VEC4, 1)]);
    let color = location(&mut ctx, &program, "color");
    let (_, native) = WebGLObject::from_js(&color)
        .unwrap()
        .uniform_location_parts()
        .unwrap();

    ctx.call(
        "uniform4f",
        &[color, 0.25.into(), 0.5.into(), 0.75.into(), 1.into()],
    )
    .unwrap();
    assert_eq!(driver.uniform_value(id, native), vec![0.25, 0.5, 0.75, 1.0]);
    assert_eq!(get_error(&mut ctx), NO_ERROR);
}

#[test]
fn test_uniform_null_location_is_silent() {
    let (mut ctx, driver) = setup();
    program_with(&mut ctx, &driver, &[]);

    ctx.call("uniform1f", &[JsValue::Null, 1.into()]).unwrap();
    ctx.call("uniform2fv", &[JsValue::Null, floats(&[1.0, 2.0])])
        .unwrap();
    assert!(!driver.was_called("glUniform1f"));
    assert!(!driver.was_called("glUniform2fv"));
    assert_eq!(get_error(&mut ctx), NO_ERROR);
}

#[test]
fn test_uniform_location_from_other_program() {
    let (mut ctx, driver) = setup();
    let (other, other_id) = program_with(&mut ctx, &driver, &[]);
    driver.add_uniform(other_id, "scale", FLOAT, 1);
    let scale = location(&mut ctx, &other, "scale");

    program_with(&mut ctx, &driver, &[]);
    ctx.call("uniform1f", &[scale, 2.into()]).unwrap();
    assert!(!driver.was_called("glUniform1f"));
    assert_eq!(get_error(&mut ctx), INVALID_OPERATION);
}

#[test]
fn test_uniform_vector_count_rules() {
    let (mut ctx, driver) = setup();
    let (program, _) = program_with(&mut ctx, &driver, &[("lights", FLOAT_VEC3, 4)]);
    let lights = location(&mut ctx, &program, "lights");

    ctx.call(
        "uniform3fv",
        &[lights.clone(), floats(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])],
    )
    .unwrap();
    let call = driver.last_call().unwrap();
    assert_eq!(call.name, "glUniform3fv");
    assert_eq!(call.arg(1), Some(&CallArg::Int(2)));
    assert_eq!(get_error(&mut ctx), NO_ERROR);

    driver.clear_calls();
    for len in [0, 2, 7] {
        let values: Vec<f32> = (0..len).map(|v| v as f32).collect();
        ctx.call("uniform3fv", &[lights.clone(), floats(&values)])
            .unwrap();
        assert!(!driver.was_called("glUniform3fv"), "length {}", len);
        assert_eq!(get_error(&mut ctx), INVALID_VALUE, "length {}", len);
    }

    ctx.call("uniform3fv", &[lights, JsValue::Null]).unwrap();
    assert_eq!(get_error(&mut ctx), INVALID_VALUE);
}

#[test]
fn test_uniform_vector_accepts_plain_sequence() {
    let (mut ctx, driver) = setup();
    let (program, _) = program_with(&mut ctx, &driver, &[("offsets", INT_VEC2, 1)]);
    let offsets = location(&mut ctx, &program, "offsets");

    ctx.call(
        "uniform2iv",
        &[offsets, JsValue::Array(vec![3.into(), (-4).into()])],
    )
    .unwrap();
    let call = driver.last_call().unwrap();
    assert_eq!(call.name, "glUniform2iv");
    assert_eq!(call.arg(2), Some(&CallArg::Ints(vec![3, -4])));
}

#[test]
fn test_uniform_vector_wrong_typed_array_is_type_error() {
    let (mut ctx, driver) = setup();
    let (program, _) = program_with(&mut ctx, &driver, &[("offsets", INT_VEC2, 1)]);
    let offsets = location(&mut ctx, &program, "offsets");

    assert!(ctx
        .call("uniform2iv", &[offsets, floats(&[1.0, 2.0])])
        .is_err());
    assert!(!driver.was_called("glUniform2iv"));
    assert_eq!(ctx.pending_error(), NO_ERROR);
}

#[test]
fn test_uniform_matrix_transpose_rejected() {
    let (mut ctx, driver) = setup();
    let (program, _) = program_with(&mut ctx, &driver, &[("mvp", FLOAT_MAT4, 1)]);
    let mvp = location(&mut ctx, &program, "mvp");
    let identity: Vec<f32> = (0..16)
        .map(|i| if i % 5 == 0 { 1.0 } else { 0.0 })
        .collect();

    ctx.call(
        "uniformMatrix4fv",
        &[mvp.clone(), true.into(), floats(&identity)],
    )
    .unwrap();
    assert!(!driver.was_called("glUniformMatrix4fv"));
    assert_eq!(get_error(&mut ctx), INVALID_VALUE);

    ctx.call("uniformMatrix4fv", &[mvp, false.into(), floats(&identity)])
        .unwrap();
    let call = driver.last_call().unwrap();
    assert_eq!(call.name, "glUniformMatrix4fv");
    assert_eq!(call.arg(1), Some(&CallArg::Int(1)));
    assert_eq!(call.arg(2), Some(&CallArg::Bool(false)));
}

// ==================== getUniform ====================

#[test]
fn test_get_uniform_shapes() {
    let (mut ctx, driver) = setup();
    let (program, _) = program_with(
        &mut ctx,
        &driver,
        &[
            ("tint", FLOAT_VEC4, 1),
            ("scale", FLOAT, 1),
            ("sampler", SAMPLER_2D, 1),
            ("enabled", BOOL, 1),
            ("mask", BOOL_VEC2, 1),
        ],
    );

    let tint = location(&mut ctx, &program, "tint");
    ctx.call(
        "uniform4f",
        &[tint.clone(), 1.into(), 2.into(), 3.into(), 4.into()],
    )
    .unwrap();
    let value = ctx.call("getUniform", &[program.clone(), tint]).unwrap();
    let array = value.as_typed_array().unwrap();
    assert_eq!(array.to_vec::<f32>().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);

    let scale = location(&mut ctx, &program, "scale");
    ctx.call("uniform1f", &[scale.clone(), 0.5.into()]).unwrap();
    assert_eq!(
        ctx.call("getUniform", &[program.clone(), scale]).unwrap(),
        JsValue::Number(0.5)
    );

    let sampler = location(&mut ctx, &program, "sampler");
    ctx.call("uniform1i", &[sampler.clone(), 3.into()]).unwrap();
    assert_eq!(
        ctx.call("getUniform", &[program.clone(), sampler]).unwrap(),
        JsValue::Number(3.0)
    );

    let enabled = location(&mut ctx, &program, "enabled");
    ctx.call("uniform1i", &[enabled.clone(), 1.into()]).unwrap();
    assert_eq!(
        ctx.call("getUniform", &[program.clone(), enabled]).unwrap(),
        JsValue::Boolean(true)
    );

    let mask = location(&mut ctx, &program, "mask");
    ctx.call("uniform2i", &[mask.clone(), 0.into(), 1.into()])
        .unwrap();
    assert_eq!(
        ctx.call("getUniform", &[program, mask]).unwrap(),
        JsValue::Array(vec![JsValue::Boolean(false), JsValue::Boolean(true)])
    );
    assert_eq!(get_error(&mut ctx), NO_ERROR);
}

#[test]
fn test_get_uniform_array_element() {
    let (mut ctx, driver) = setup();
    let (program, _) = program_with(&mut ctx, &driver, &[("weights", FLOAT, 3)]);
    let weights = location(&mut ctx, &program, "weights");
    ctx.call(
        "uniform1fv",
        &[weights, floats(&[0.1, 0.2, 0.3])],
    )
    .unwrap();

    let second = location(&mut ctx, &program, "weights[1]");
    let value = ctx.call("getUniform", &[program, second]).unwrap();
    match value {
        JsValue::Number(n) => assert!((n - 0.2).abs() < 1e-6),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_get_uniform_location_unknown_name() {
    let (mut ctx, driver) = setup();
    let (program, _) = program_with(&mut ctx, &driver, &[("tint", FLOAT_VEC4, 1)]);
    assert_eq!(location(&mut ctx, &program, "missing"), JsValue::Null);
    assert_eq!(get_error(&mut ctx), NO_ERROR);
}

// ==================== Introspection ====================

#[test]
fn test_active_uniform_array_name_gets_suffix() {
    let (mut ctx, driver) = setup();
    let (program, _) = program_with(
        &mut ctx,
        &driver,
        &[("lights", FLOAT_VEC3, 4), ("bones[0]", FLOAT_MAT4, 2), ("tint", FLOAT_VEC4, 1)],
    );

    let name_at = |ctx: &mut RenderingContext, index: i32| {
        let info = ctx
            .call("getActiveUniform", &[program.clone(), index.into()])
            .unwrap();
        let info = WebGLObject::from_js(&info).unwrap();
        info.active_info_data().unwrap().name.clone()
    };
    assert_eq!(name_at(&mut ctx, 0), "lights[0]");
    assert_eq!(name_at(&mut ctx, 1), "bones[0]");
    assert_eq!(name_at(&mut ctx, 2), "tint");

    let missing = ctx
        .call("getActiveUniform", &[program.clone(), 9.into()])
        .unwrap();
    assert_eq!(missing, JsValue::Null);
    assert_eq!(get_error(&mut ctx), INVALID_VALUE);
}

#[test]
fn test_attrib_queries() {
    let (mut ctx, driver) = setup();
    let program = ctx.call("createProgram", &[]).unwrap();
    driver.add_attrib(native_id(&program), "position", FLOAT_VEC3, 1);

    assert_eq!(
        ctx.call("getAttribLocation", &[program.clone(), "position".into()])
            .unwrap(),
        JsValue::Number(0.0)
    );
    assert_eq!(
        ctx.call("getAttribLocation", &[program.clone(), "normal".into()])
            .unwrap(),
        JsValue::Number(-1.0)
    );

    let info = ctx
        .call("getActiveAttrib", &[program.clone(), 0.into()])
        .unwrap();
    let info = WebGLObject::from_js(&info).unwrap();
    let data = info.active_info_data().unwrap();
    assert_eq!(data.name, "position");
    assert_eq!(data.type_, FLOAT_VEC3);
    assert_eq!(data.size, 1);
}

#[test]
fn test_program_parameters() {
    let (mut ctx, driver) = setup();
    let program = ctx.call("createProgram", &[]).unwrap();
    driver.add_uniform(native_id(&program), "tint", FLOAT_VEC4, 1);

    let param = |ctx: &mut RenderingContext, pname: u32| {
        ctx.call("getProgramParameter", &[program.clone(), num(pname)])
            .unwrap()
    };
    assert_eq!(param(&mut ctx, LINK_STATUS), JsValue::Boolean(false));
    ctx.call("linkProgram", &[program.clone()]).unwrap();
    assert_eq!(param(&mut ctx, LINK_STATUS), JsValue::Boolean(true));
    assert_eq!(param(&mut ctx, ACTIVE_UNIFORMS), JsValue::Number(1.0));
    assert_eq!(param(&mut ctx, ATTACHED_SHADERS), JsValue::Number(0.0));

    assert_eq!(param(&mut ctx, COMPILE_STATUS), JsValue::Null);
    assert_eq!(get_error(&mut ctx), INVALID_ENUM);
}

#[test]
fn test_attached_shaders_are_wrappers() {
    let (mut ctx, driver) = setup();
    let program = ctx.call("createProgram", &[]).unwrap();
    let vertex = ctx.call("createShader", &[num(VERTEX_SHADER)]).unwrap();
    let fragment = ctx.call("createShader", &[num(FRAGMENT_SHADER)]).unwrap();

    ctx.call("attachShader", &[program.clone(), vertex.clone()])
        .unwrap();
    ctx.call("attachShader", &[program.clone(), fragment.clone()])
        .unwrap();
    ctx.call("detachShader", &[program.clone(), fragment]).unwrap();
    assert_eq!(driver.calls_named("glAttachShader").len(), 2);

    let shaders = ctx.call("getAttachedShaders", &[program]).unwrap();
    let shaders = shaders.as_array().unwrap();
    assert_eq!(shaders.len(), 1);
    assert!(Rc::ptr_eq(
        &WebGLObject::from_js(&shaders[0]).unwrap(),
        &WebGLObject::from_js(&vertex).unwrap()
    ));
}

#[test]
fn test_program_required() {
    let (mut ctx, driver) = setup();

    ctx.call("linkProgram", &[JsValue::Null]).unwrap();
    assert!(!driver.was_called("glLinkProgram"));
    assert_eq!(get_error(&mut ctx), INVALID_VALUE);

    // useProgram(null) unbinds instead.
    ctx.call("useProgram", &[JsValue::Null]).unwrap();
    let call = driver.last_call().unwrap();
    assert_eq!(call.name, "glUseProgram");
    assert_eq!(call.arg(0), Some(&CallArg::Int(0)));
    assert_eq!(get_error(&mut ctx), NO_ERROR);
}

#[test]
fn test_deleted_program_stays_current() {
    let (mut ctx, driver) = setup();
    let (program, _) = program_with(&mut ctx, &driver, &[]);

    ctx.call("deleteProgram", &[program.clone()]).unwrap();
    assert!(driver.was_called("glDeleteProgram"));
    assert_eq!(get_error(&mut ctx), NO_ERROR);

    let current = ctx
        .call("getParameter", &[num(CURRENT_PROGRAM)])
        .unwrap();
    let current = WebGLObject::from_js(&current).unwrap();
    assert!(Rc::ptr_eq(&current, &WebGLObject::from_js(&program).unwrap()));
    assert!(current.is_deleted());

    // Replacing it lets the deleted program go.
    ctx.call("useProgram", &[JsValue::Null]).unwrap();
    let current = ctx
        .call("getParameter", &[num(CURRENT_PROGRAM)])
        .unwrap();
    assert_eq!(current, JsValue::Null);
}
