//! Texture objects and uploads.

use tracing::debug;

use super::{align_up, create_object, delete_object, id_of, is_object, HandlerResult};
use crate::constants::*;
use crate::context::RenderingContext;
use crate::marshal::Arguments;
use crate::objects::ObjectKind;
use crate::validate::is_cube_map_face;
use crate::{JsValue, TypedArray, TypedArrayKind};

const TEXTURE_FORMATS: [u32; 5] = [ALPHA, LUMINANCE, LUMINANCE_ALPHA, RGB, RGBA];

pub(crate) fn active_texture(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let texture = args.u32(0)?;
    let units = ctx.integer(MAX_COMBINED_TEXTURE_IMAGE_UNITS).max(0) as u32;
    if texture < TEXTURE0 || texture - TEXTURE0 >= units {
        debug!(texture, units, "activeTexture: unit out of range");
        ctx.set_error(INVALID_ENUM);
        return Ok(JsValue::Undefined);
    }
    ctx.driver().active_texture(texture);
    Ok(JsValue::Undefined)
}

pub(crate) fn create_texture(ctx: &mut RenderingContext, _: &Arguments<'_>) -> HandlerResult {
    create_object(ctx, ObjectKind::Texture)
}

pub(crate) fn delete_texture(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    delete_object(ctx, args, ObjectKind::Texture, "deleteTexture")
}

pub(crate) fn is_texture(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    is_object(ctx, args, ObjectKind::Texture)
}

pub(crate) fn bind_texture(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let target = args.u32(0)?;
    let texture = args.object(1, ObjectKind::Texture)?;
    let validator = ctx.validator();
    if validator.texture_binding("bindTexture", target, false)
        && validator.validate_object("bindTexture", texture.as_ref())
    {
        ctx.driver().bind_texture(target, id_of(texture.as_ref()));
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn generate_mipmap(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let target = args.u32(0)?;
    if ctx
        .validator()
        .texture_binding("generateMipmap", target, false)
    {
        ctx.driver().generate_mipmap(target);
    }
    Ok(JsValue::Undefined)
}

// ==================== Parameters ====================

pub(crate) fn get_tex_parameter(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (target, pname) = (args.u32(0)?, args.u32(1)?);
    let validator = ctx.validator();
    if !validator.texture_binding("getTexParameter", target, false)
        || !validator.enum_in(
            "getTexParameter",
            pname,
            &[TEXTURE_MIN_FILTER, TEXTURE_MAG_FILTER, TEXTURE_WRAP_S, TEXTURE_WRAP_T],
            "invalid texture parameter name",
        )
    {
        return Ok(JsValue::Null);
    }
    Ok(ctx.driver().get_tex_parameter_iv(target, pname).into())
}

pub(crate) fn tex_parameterf(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (target, pname, param) = (args.u32(0)?, args.u32(1)?, args.f32(2)?);
    let validator = ctx.validator();
    if validator.texture_binding("texParameterf", target, false)
        && validator.tex_parameter("texParameterf", pname, param as i32)
    {
        ctx.driver().tex_parameter_f(target, pname, param);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn tex_parameteri(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (target, pname, param) = (args.u32(0)?, args.u32(1)?, args.i32(2)?);
    let validator = ctx.validator();
    if validator.texture_binding("texParameteri", target, false)
        && validator.tex_parameter("texParameteri", pname, param)
    {
        ctx.driver().tex_parameter_i(target, pname, param);
    }
    Ok(JsValue::Undefined)
}

// ==================== Copies ====================

pub(crate) fn copy_tex_image_2d(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (target, level, internal_format) = (args.u32(0)?, args.i32(1)?, args.u32(2)?);
    let (x, y, width, height) = (args.i32(3)?, args.i32(4)?, args.i32(5)?, args.i32(6)?);
    let border = args.i32(7)?;
    let caller = "copyTexImage2D";
    let validator = ctx.validator();
    if !validator.texture_binding(caller, target, true)
        || !validator.enum_in(caller, internal_format, &TEXTURE_FORMATS, "invalid internal format")
    {
        return Ok(JsValue::Undefined);
    }
    if level < 0 || width < 0 || height < 0 || border != 0 {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    if is_cube_map_face(target) && width != height {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    ctx.driver()
        .copy_tex_image_2d(target, level, internal_format, x, y, width, height, border);
    Ok(JsValue::Undefined)
}

pub(crate) fn copy_tex_sub_image_2d(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (target, level) = (args.u32(0)?, args.i32(1)?);
    let (xoffset, yoffset) = (args.i32(2)?, args.i32(3)?);
    let (x, y, width, height) = (args.i32(4)?, args.i32(5)?, args.i32(6)?, args.i32(7)?);
    if !ctx
        .validator()
        .texture_binding("copyTexSubImage2D", target, true)
    {
        return Ok(JsValue::Undefined);
    }
    if level < 0 || width < 0 || height < 0 {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    ctx.driver()
        .copy_tex_sub_image_2d(target, level, xoffset, yoffset, x, y, width, height);
    Ok(JsValue::Undefined)
}

// ==================== Uploads ====================

fn bytes_per_pixel(format: u32, type_: u32) -> usize {
    match type_ {
        UNSIGNED_SHORT_5_6_5 | UNSIGNED_SHORT_4_4_4_4 | UNSIGNED_SHORT_5_5_5_1 => 2,
        _ => match format {
            LUMINANCE_ALPHA => 2,
            RGB => 3,
            RGBA => 4,
            _ => 1,
        },
    }
}

/// Check that `pixels` matches `type_` and covers the unpack-aligned
/// rectangle. Posts INVALID_OPERATION otherwise.
fn check_pixels(
    ctx: &RenderingContext,
    caller: &str,
    pixels: &TypedArray,
    width: i32,
    height: i32,
    format: u32,
    type_: u32,
) -> bool {
    let expected = if type_ == UNSIGNED_BYTE {
        TypedArrayKind::Uint8
    } else {
        TypedArrayKind::Uint16
    };
    if pixels.kind() != expected {
        debug!(caller, found = pixels.kind().name(), "Pixel array type mismatch");
        ctx.set_error(INVALID_OPERATION);
        return false;
    }

    let (width, height) = (width as usize, height as usize);
    let row = width * bytes_per_pixel(format, type_);
    let needed = match height {
        0 => 0,
        _ => align_up(row, ctx.pixel_store.unpack_alignment as usize) * (height - 1) + row,
    };
    if pixels.byte_length() < needed {
        debug!(caller, needed, available = pixels.byte_length(), "Pixel array too small");
        ctx.set_error(INVALID_OPERATION);
        return false;
    }
    true
}

/// `texImage2D` with an `ArrayBufferView` (9 arguments). The image-source
/// overloads are accepted and ignored.
pub(crate) fn tex_image_2d(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    if args.len() < 9 {
        debug!(argc = args.len(), "texImage2D: image source uploads are not supported");
        return Ok(JsValue::Undefined);
    }
    let (target, level, internal_format) = (args.u32(0)?, args.i32(1)?, args.u32(2)?);
    let (width, height, border) = (args.i32(3)?, args.i32(4)?, args.i32(5)?);
    let (format, type_) = (args.u32(6)?, args.u32(7)?);
    let pixels = args.typed_array(8)?;

    let caller = "texImage2D";
    let validator = ctx.validator();
    if !validator.texture_binding(caller, target, true)
        || !validator.tex_func_parameters(
            caller,
            target,
            level,
            internal_format,
            width,
            height,
            border,
            format,
            type_,
        )
    {
        return Ok(JsValue::Undefined);
    }

    let driver = ctx.driver();
    match pixels {
        Some(pixels) => {
            if check_pixels(ctx, caller, &pixels, width, height, format, type_) {
                pixels.with_bytes(|bytes| {
                    driver.tex_image_2d(
                        target,
                        level,
                        internal_format,
                        width,
                        height,
                        border,
                        format,
                        type_,
                        Some(bytes),
                    )
                });
            }
        }
        None => driver.tex_image_2d(
            target,
            level,
            internal_format,
            width,
            height,
            border,
            format,
            type_,
            None,
        ),
    }
    Ok(JsValue::Undefined)
}

/// `texSubImage2D` with an `ArrayBufferView` (9 arguments). The
/// image-source overloads are accepted and ignored.
pub(crate) fn tex_sub_image_2d(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    if args.len() < 9 {
        debug!(argc = args.len(), "texSubImage2D: image source uploads are not supported");
        return Ok(JsValue::Undefined);
    }
    let (target, level) = (args.u32(0)?, args.i32(1)?);
    let (xoffset, yoffset) = (args.i32(2)?, args.i32(3)?);
    let (width, height) = (args.i32(4)?, args.i32(5)?);
    let (format, type_) = (args.u32(6)?, args.u32(7)?);
    let pixels = args.typed_array(8)?;

    let caller = "texSubImage2D";
    let validator = ctx.validator();
    if !validator.texture_binding(caller, target, true)
        || !validator.tex_format_and_type(caller, format, type_)
    {
        return Ok(JsValue::Undefined);
    }
    if level < 0 || width < 0 || height < 0 {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    let Some(pixels) = pixels else {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    };
    if !check_pixels(ctx, caller, &pixels, width, height, format, type_) {
        return Ok(JsValue::Undefined);
    }

    let driver = ctx.driver();
    pixels.with_bytes(|bytes| {
        driver.tex_sub_image_2d(
            target, level, xoffset, yoffset, width, height, format, type_, bytes,
        )
    });
    Ok(JsValue::Undefined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(bytes_per_pixel(RGBA, UNSIGNED_BYTE), 4);
        assert_eq!(bytes_per_pixel(RGB, UNSIGNED_BYTE), 3);
        assert_eq!(bytes_per_pixel(LUMINANCE_ALPHA, UNSIGNED_BYTE), 2);
        assert_eq!(bytes_per_pixel(ALPHA, UNSIGNED_BYTE), 1);
        assert_eq!(bytes_per_pixel(RGB, UNSIGNED_SHORT_5_6_5), 2);
    }
}
