//! Arguments produced by the script engine flow through unchanged.

use webgl_core::constants::*;
use webgl_core::{CallArg, JsValue, RecordingDriver, RenderingContext};
use webgl_js::JsRuntime;

fn setup() -> (RenderingContext, RecordingDriver, JsRuntime) {
    let driver = RecordingDriver::new();
    let ctx = RenderingContext::with_driver(driver.clone());
    (ctx, driver, JsRuntime::new().unwrap())
}

#[test]
fn test_script_typed_array_uploads_bytes() {
    let (mut ctx, driver, mut runtime) = setup();
    let buffer = ctx.call("createBuffer", &[]).unwrap();
    ctx.call("bindBuffer", &[ARRAY_BUFFER.into(), buffer]).unwrap();

    let data = runtime
        .evaluate_script("new Float32Array([1, 2, 3, 4])")
        .unwrap();
    ctx.call("bufferData", &[ARRAY_BUFFER.into(), data, STATIC_DRAW.into()])
        .unwrap();

    let call = driver.last_call().unwrap();
    assert_eq!(call.name, "glBufferData");
    assert_eq!(call.arg(1), Some(&CallArg::Int(16)));
}

#[test]
fn test_script_sequence_feeds_uniform_vector() {
    let (mut ctx, driver, mut runtime) = setup();
    let program = ctx.call("createProgram", &[]).unwrap();
    let id = webgl_core::WebGLObject::from_js(&program).unwrap().webgl_id();
    driver.add_uniform(id, "offset", FLOAT_VEC2, 1);
    ctx.call("useProgram", &[program.clone()]).unwrap();
    let offset = ctx
        .call("getUniformLocation", &[program, "offset".into()])
        .unwrap();

    let values = runtime.evaluate_script("[0.5, 0.25]").unwrap();
    ctx.call("uniform2fv", &[offset, values]).unwrap();

    let call = driver.last_call().unwrap();
    assert_eq!(call.name, "glUniform2fv");
    assert_eq!(call.arg(2), Some(&CallArg::Floats(vec![0.5, 0.25])));
}

#[test]
fn test_script_number_coercions() {
    let (mut ctx, driver, mut runtime) = setup();

    // ToInt32 wraps; strings convert with ToNumber.
    let x = runtime.evaluate_script("4294967297").unwrap();
    let width = runtime.evaluate_script("'64'").unwrap();
    ctx.call("viewport", &[x, 0.into(), width, 32.into()]).unwrap();

    let call = driver.last_call().unwrap();
    assert_eq!(
        call.args,
        vec![
            CallArg::Int(1),
            CallArg::Int(0),
            CallArg::Int(64),
            CallArg::Int(32)
        ]
    );
}

#[test]
fn test_script_function_is_type_error() {
    let (mut ctx, driver, mut runtime) = setup();
    let callback = runtime.evaluate_script("(function () {})").unwrap();
    assert_eq!(callback, JsValue::Function);

    assert!(ctx.call("clearDepth", &[callback]).is_err());
    assert!(!driver.was_called("glClearDepthf"));
}
