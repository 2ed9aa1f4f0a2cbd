//! `getParameter`, pixel storage, textures and framebuffers.

use std::rc::Rc;

use webgl_core::constants::*;
use webgl_core::{
    CallArg, ContextConfig, JsValue, RecordingDriver, RenderingContext, TypedArray,
    TypedArrayKind, WebGLObject,
};

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

fn parameter(ctx: &mut RenderingContext, pname: u32) -> JsValue {
    ctx.call("getParameter", &[num(pname)]).unwrap()
}

fn same_object(a: &JsValue, b: &JsValue) -> bool {
    match (WebGLObject::from_js(a), WebGLObject::from_js(b)) {
        (Some(a), Some(b)) => Rc::ptr_eq(&a, &b),
        _ => false,
    }
}

// ==================== getParameter ====================

#[test]
fn test_version_strings_are_prefixed() {
    let (mut ctx, driver) = setup();
    driver.set_string(VERSION, "OpenGL ES 2.0 Mesa");

    assert_eq!(
        parameter(&mut ctx, VERSION),
        JsValue::from("WebGL 1.0 (OpenGL ES 2.0 Mesa)")
    );
    assert_eq!(
        parameter(&mut ctx, SHADING_LANGUAGE_VERSION),
        JsValue::from("WebGL GLSL ES 1.0 (OpenGL ES GLSL ES 1.00 recording)")
    );
}

#[test]
fn test_vendor_and_renderer_from_config() {
    let driver = RecordingDriver::new();
    let config = ContextConfig::default().with_renderer("Headless WebGL");
    let mut ctx = RenderingContext::new(driver.clone(), config);

    assert_eq!(parameter(&mut ctx, VENDOR), JsValue::from("webgl-core"));
    assert_eq!(parameter(&mut ctx, RENDERER), JsValue::from("Headless WebGL"));
    assert!(!driver.was_called("glGetString"));
}

#[test]
fn test_array_parameters() {
    let (mut ctx, _driver) = setup();

    let viewport = parameter(&mut ctx, VIEWPORT);
    let viewport = viewport.as_typed_array().unwrap();
    assert_eq!(viewport.kind(), TypedArrayKind::Int32);
    assert_eq!(viewport.to_vec::<i32>().unwrap(), vec![0, 0, 300, 150]);

    ctx.call("viewport", &[1.into(), 2.into(), 30.into(), 40.into()])
        .unwrap();
    let viewport = parameter(&mut ctx, VIEWPORT);
    assert_eq!(
        viewport.as_typed_array().unwrap().to_vec::<i32>().unwrap(),
        vec![1, 2, 30, 40]
    );

    let range = parameter(&mut ctx, DEPTH_RANGE);
    let range = range.as_typed_array().unwrap();
    assert_eq!(range.kind(), TypedArrayKind::Float32);
    assert_eq!(range.to_vec::<f32>().unwrap(), vec![0.0, 1.0]);

    assert_eq!(
        parameter(&mut ctx, COLOR_WRITEMASK),
        JsValue::Array(vec![JsValue::Boolean(true); 4])
    );

    let formats = parameter(&mut ctx, COMPRESSED_TEXTURE_FORMATS);
    let formats = formats.as_typed_array().unwrap();
    assert_eq!(formats.kind(), TypedArrayKind::Uint32);
    assert!(formats.is_empty());
}

#[test]
fn test_scalar_parameters() {
    let (mut ctx, _driver) = setup();

    assert_eq!(parameter(&mut ctx, BLEND), JsValue::Boolean(false));
    assert_eq!(parameter(&mut ctx, MAX_VERTEX_ATTRIBS), JsValue::Number(16.0));
    assert_eq!(parameter(&mut ctx, LINE_WIDTH), JsValue::Number(1.0));
    assert_eq!(
        parameter(&mut ctx, STENCIL_WRITEMASK),
        JsValue::Number(u32::MAX as f64)
    );
    assert_eq!(get_error(&mut ctx), NO_ERROR);
}

#[test]
fn test_binding_parameters_return_wrappers() {
    let (mut ctx, _driver) = setup();
    assert_eq!(parameter(&mut ctx, CURRENT_PROGRAM), JsValue::Null);
    assert_eq!(parameter(&mut ctx, ARRAY_BUFFER_BINDING), JsValue::Null);

    let program = ctx.call("createProgram", &[]).unwrap();
    ctx.call("useProgram", &[program.clone()]).unwrap();
    assert!(same_object(&parameter(&mut ctx, CURRENT_PROGRAM), &program));

    let texture = ctx.call("createTexture", &[]).unwrap();
    ctx.call("bindTexture", &[num(TEXTURE_2D), texture.clone()])
        .unwrap();
    assert!(same_object(&parameter(&mut ctx, TEXTURE_BINDING_2D), &texture));

    ctx.call("deleteTexture", &[texture]).unwrap();
    assert_eq!(parameter(&mut ctx, TEXTURE_BINDING_2D), JsValue::Null);
}

#[test]
fn test_unknown_parameter() {
    let (mut ctx, _driver) = setup();
    assert_eq!(parameter(&mut ctx, 0xdead), JsValue::Undefined);
    assert_eq!(get_error(&mut ctx), INVALID_ENUM);
}

// ==================== Blending ====================

#[test]
fn test_blend_func_rejects_unknown_factors() {
    let (mut ctx, driver) = setup();

    ctx.call("blendFunc", &[num(0x1234), num(0x5678)]).unwrap();
    assert_eq!(get_error(&mut ctx), INVALID_ENUM);
    ctx.call("blendFunc", &[num(ONE), num(SRC_ALPHA_SATURATE)])
        .unwrap();
    assert_eq!(get_error(&mut ctx), INVALID_ENUM);
    assert!(!driver.was_called("glBlendFunc"));

    ctx.call("blendFunc", &[num(SRC_ALPHA_SATURATE), num(ONE)])
        .unwrap();
    assert_eq!(get_error(&mut ctx), NO_ERROR);
    assert!(driver.was_called("glBlendFunc"));
}

#[test]
fn test_blend_func_separate_checks_alpha_factors() {
    let (mut ctx, driver) = setup();

    let args = [num(ONE), num(ZERO), num(ONE), num(0x1234)];
    ctx.call("blendFuncSeparate", &args).unwrap();
    assert_eq!(get_error(&mut ctx), INVALID_ENUM);
    assert!(!driver.was_called("glBlendFuncSeparate"));

    let args = [num(SRC_ALPHA), num(ONE_MINUS_SRC_ALPHA), num(ONE), num(ZERO)];
    ctx.call("blendFuncSeparate", &args).unwrap();
    assert_eq!(get_error(&mut ctx), NO_ERROR);
    assert!(driver.was_called("glBlendFuncSeparate"));
}

// ==================== Pixel storage ====================

#[test]
fn test_pixel_store_webgl_parameters() {
    let (mut ctx, driver) = setup();

    ctx.call("pixelStorei", &[num(UNPACK_FLIP_Y_WEBGL), 1.into()])
        .unwrap();
    ctx.call("pixelStorei", &[num(UNPACK_COLORSPACE_CONVERSION_WEBGL), num(NONE)])
        .unwrap();
    assert_eq!(parameter(&mut ctx, UNPACK_FLIP_Y_WEBGL), JsValue::Boolean(true));
    assert_eq!(
        parameter(&mut ctx, UNPACK_COLORSPACE_CONVERSION_WEBGL),
        num(NONE)
    );
    assert!(!driver.was_called("glPixelStorei"));

    ctx.call("pixelStorei", &[num(UNPACK_COLORSPACE_CONVERSION_WEBGL), 7.into()])
        .unwrap();
    assert_eq!(get_error(&mut ctx), INVALID_ENUM);
}

#[test]
fn test_pixel_store_alignment() {
    let (mut ctx, driver) = setup();

    ctx.call("pixelStorei", &[num(PACK_ALIGNMENT), 3.into()])
        .unwrap();
    assert!(!driver.was_called("glPixelStorei"));
    assert_eq!(get_error(&mut ctx), INVALID_VALUE);

    ctx.call("pixelStorei", &[num(PACK_ALIGNMENT), 8.into()])
        .unwrap();
    assert!(driver.was_called("glPixelStorei"));
    assert_eq!(parameter(&mut ctx, PACK_ALIGNMENT), JsValue::Number(8.0));

    // Rows of 2 RGBA pixels now pad to 8 bytes; 3 rows need 24.
    let pixels = TypedArray::new(TypedArrayKind::Uint8, 24);
    ctx.call(
        "readPixels",
        &[
            0.into(),
            0.into(),
            2.into(),
            3.into(),
            num(RGBA),
            num(UNSIGNED_BYTE),
            pixels.into(),
        ],
    )
    .unwrap();
    assert!(driver.was_called("glReadPixels"));
    assert_eq!(get_error(&mut ctx), NO_ERROR);
}

// ==================== Textures ====================

fn tex_image(width: i32, height: i32, pixels: JsValue) -> Vec<JsValue> {
    vec![
        num(TEXTURE_2D),
        0.into(),
        num(RGB),
        width.into(),
        height.into(),
        0.into(),
        num(RGB),
        num(UNSIGNED_BYTE),
        pixels,
    ]
}

#[test]
fn test_tex_image_checks_unpack_size() {
    let (mut ctx, driver) = setup();
    let texture = ctx.call("createTexture", &[]).unwrap();
    ctx.call("bindTexture", &[num(TEXTURE_2D), texture]).unwrap();

    // 3 RGB pixels = 9 bytes per row, padded to 12: 12 + 9 bytes in total.
    let short = TypedArray::new(TypedArrayKind::Uint8, 20);
    ctx.call("texImage2D", &tex_image(3, 2, short.into()))
        .unwrap();
    assert!(!driver.was_called("glTexImage2D"));
    assert_eq!(get_error(&mut ctx), INVALID_OPERATION);

    let exact = TypedArray::new(TypedArrayKind::Uint8, 21);
    ctx.call("texImage2D", &tex_image(3, 2, exact.into()))
        .unwrap();
    assert!(driver.was_called("glTexImage2D"));
    assert_eq!(get_error(&mut ctx), NO_ERROR);

    driver.clear_calls();
    let wrong_kind = TypedArray::new(TypedArrayKind::Float32, 32);
    ctx.call("texImage2D", &tex_image(3, 2, wrong_kind.into()))
        .unwrap();
    assert!(!driver.was_called("glTexImage2D"));
    assert_eq!(get_error(&mut ctx), INVALID_OPERATION);
}

#[test]
fn test_tex_image_null_pixels_allocates() {
    let (mut ctx, driver) = setup();
    ctx.call("texImage2D", &tex_image(4, 4, JsValue::Null))
        .unwrap();
    let call = driver.last_call().unwrap();
    assert_eq!(call.name, "glTexImage2D");
    assert_eq!(call.arg(8), Some(&CallArg::Bytes(None)));
}

#[test]
fn test_tex_image_source_overload_is_ignored() {
    let (mut ctx, driver) = setup();
    ctx.call(
        "texImage2D",
        &[
            num(TEXTURE_2D),
            0.into(),
            num(RGBA),
            num(RGBA),
            num(UNSIGNED_BYTE),
            JsValue::Null,
        ],
    )
    .unwrap();
    assert!(!driver.was_called("glTexImage2D"));
    assert_eq!(get_error(&mut ctx), NO_ERROR);
}

#[test]
fn test_tex_parameters() {
    let (mut ctx, driver) = setup();
    let texture = ctx.call("createTexture", &[]).unwrap();
    ctx.call("bindTexture", &[num(TEXTURE_2D), texture]).unwrap();

    ctx.call(
        "texParameteri",
        &[num(TEXTURE_2D), num(TEXTURE_MIN_FILTER), num(NEAREST)],
    )
    .unwrap();
    assert_eq!(
        ctx.call("getTexParameter", &[num(TEXTURE_2D), num(TEXTURE_MIN_FILTER)])
            .unwrap(),
        num(NEAREST)
    );

    driver.clear_calls();
    ctx.call(
        "texParameteri",
        &[num(TEXTURE_2D), num(TEXTURE_MAG_FILTER), num(NEAREST_MIPMAP_NEAREST)],
    )
    .unwrap();
    assert!(!driver.was_called("glTexParameteri"));
    assert_eq!(get_error(&mut ctx), INVALID_ENUM);
}

#[test]
fn test_active_texture_range() {
    let (mut ctx, driver) = setup();

    ctx.call("activeTexture", &[num(TEXTURE0 + 31)]).unwrap();
    assert!(driver.was_called("glActiveTexture"));
    assert_eq!(get_error(&mut ctx), NO_ERROR);

    driver.clear_calls();
    ctx.call("activeTexture", &[num(TEXTURE0 + 32)]).unwrap();
    assert!(!driver.was_called("glActiveTexture"));
    assert_eq!(get_error(&mut ctx), INVALID_ENUM);
}

// ==================== Framebuffers ====================

#[test]
fn test_framebuffer_attachment_reports_wrapper() {
    let (mut ctx, _driver) = setup();
    let framebuffer = ctx.call("createFramebuffer", &[]).unwrap();
    ctx.call("bindFramebuffer", &[num(FRAMEBUFFER), framebuffer])
        .unwrap();
    let renderbuffer = ctx.call("createRenderbuffer", &[]).unwrap();

    ctx.call(
        "framebufferRenderbuffer",
        &[
            num(FRAMEBUFFER),
            num(DEPTH_ATTACHMENT),
            num(RENDERBUFFER),
            renderbuffer.clone(),
        ],
    )
    .unwrap();

    let kind = ctx
        .call(
            "getFramebufferAttachmentParameter",
            &[
                num(FRAMEBUFFER),
                num(DEPTH_ATTACHMENT),
                num(FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE),
            ],
        )
        .unwrap();
    assert_eq!(kind, num(RENDERBUFFER));

    let attached = ctx
        .call(
            "getFramebufferAttachmentParameter",
            &[
                num(FRAMEBUFFER),
                num(DEPTH_ATTACHMENT),
                num(FRAMEBUFFER_ATTACHMENT_OBJECT_NAME),
            ],
        )
        .unwrap();
    assert!(same_object(&attached, &renderbuffer));

    assert_eq!(
        ctx.call("checkFramebufferStatus", &[num(FRAMEBUFFER)]).unwrap(),
        num(FRAMEBUFFER_COMPLETE)
    );
    assert_eq!(
        ctx.call("checkFramebufferStatus", &[num(RENDERBUFFER)]).unwrap(),
        JsValue::Number(0.0)
    );
    assert_eq!(get_error(&mut ctx), INVALID_ENUM);
}

#[test]
fn test_framebuffer_texture_level_must_be_zero() {
    let (mut ctx, driver) = setup();
    let texture = ctx.call("createTexture", &[]).unwrap();

    ctx.call(
        "framebufferTexture2D",
        &[
            num(FRAMEBUFFER),
            num(COLOR_ATTACHMENT0),
            num(TEXTURE_2D),
            texture,
            1.into(),
        ],
    )
    .unwrap();
    assert!(!driver.was_called("glFramebufferTexture2D"));
    assert_eq!(get_error(&mut ctx), INVALID_VALUE);
}
