//! Framebuffers, renderbuffers and pixel readback.

use tracing::debug;

use super::{align_up, create_object, delete_object, id_of, is_object, HandlerResult};
use crate::constants::*;
use crate::context::RenderingContext;
use crate::marshal::Arguments;
use crate::objects::ObjectKind;
use crate::{JsValue, TypeError, TypedArrayKind};

// ==================== Framebuffers ====================

pub(crate) fn create_framebuffer(ctx: &mut RenderingContext, _: &Arguments<'_>) -> HandlerResult {
    create_object(ctx, ObjectKind::Framebuffer)
}

pub(crate) fn delete_framebuffer(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    delete_object(ctx, args, ObjectKind::Framebuffer, "deleteFramebuffer")
}

pub(crate) fn is_framebuffer(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    is_object(ctx, args, ObjectKind::Framebuffer)
}

pub(crate) fn bind_framebuffer(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let target = args.u32(0)?;
    let framebuffer = args.object(1, ObjectKind::Framebuffer)?;
    let validator = ctx.validator();
    if validator.enum_in("bindFramebuffer", target, &[FRAMEBUFFER], "invalid target")
        && validator.validate_object("bindFramebuffer", framebuffer.as_ref())
    {
        ctx.driver()
            .bind_framebuffer(target, id_of(framebuffer.as_ref()));
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn check_framebuffer_status(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let target = args.u32(0)?;
    if !ctx
        .validator()
        .enum_in("checkFramebufferStatus", target, &[FRAMEBUFFER], "invalid target")
    {
        return Ok(0.into());
    }
    Ok(ctx.driver().check_framebuffer_status(target).into())
}

pub(crate) fn framebuffer_renderbuffer(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (target, attachment, rb_target) = (args.u32(0)?, args.u32(1)?, args.u32(2)?);
    let renderbuffer = args.object(3, ObjectKind::Renderbuffer)?;
    let caller = "framebufferRenderbuffer";
    let validator = ctx.validator();
    if validator.framebuffer_func_parameters(caller, target, attachment)
        && validator.enum_in(caller, rb_target, &[RENDERBUFFER], "invalid renderbuffer target")
        && validator.validate_object(caller, renderbuffer.as_ref())
    {
        ctx.driver().framebuffer_renderbuffer(
            target,
            attachment,
            rb_target,
            id_of(renderbuffer.as_ref()),
        );
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn framebuffer_texture_2d(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (target, attachment, tex_target) = (args.u32(0)?, args.u32(1)?, args.u32(2)?);
    let texture = args.object(3, ObjectKind::Texture)?;
    let level = args.i32(4)?;
    let caller = "framebufferTexture2D";
    let validator = ctx.validator();
    if !(validator.framebuffer_func_parameters(caller, target, attachment)
        && validator.texture_binding(caller, tex_target, true)
        && validator.validate_object(caller, texture.as_ref()))
    {
        return Ok(JsValue::Undefined);
    }
    if level != 0 {
        debug!(level, "framebufferTexture2D: level must be 0");
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    ctx.driver().framebuffer_texture_2d(
        target,
        attachment,
        tex_target,
        id_of(texture.as_ref()),
        level,
    );
    Ok(JsValue::Undefined)
}

pub(crate) fn get_framebuffer_attachment_parameter(
    ctx: &mut RenderingContext,
    args: &Arguments<'_>,
) -> HandlerResult {
    let (target, attachment, pname) = (args.u32(0)?, args.u32(1)?, args.u32(2)?);
    let caller = "getFramebufferAttachmentParameter";
    let validator = ctx.validator();
    if !validator.framebuffer_func_parameters(caller, target, attachment)
        || !validator.enum_in(
            caller,
            pname,
            &[
                FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE,
                FRAMEBUFFER_ATTACHMENT_OBJECT_NAME,
                FRAMEBUFFER_ATTACHMENT_TEXTURE_LEVEL,
                FRAMEBUFFER_ATTACHMENT_TEXTURE_CUBE_MAP_FACE,
            ],
            "invalid attachment parameter",
        )
    {
        return Ok(JsValue::Null);
    }

    let driver = ctx.driver();
    let value = driver.get_framebuffer_attachment_parameter_iv(target, attachment, pname);
    if pname != FRAMEBUFFER_ATTACHMENT_OBJECT_NAME {
        return Ok(value.into());
    }
    let kind = driver.get_framebuffer_attachment_parameter_iv(
        target,
        attachment,
        FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE,
    ) as u32;
    Ok(match kind {
        RENDERBUFFER => ctx.lookup_js(ObjectKind::Renderbuffer, value as u32),
        TEXTURE => ctx.lookup_js(ObjectKind::Texture, value as u32),
        _ => JsValue::Null,
    })
}

// ==================== Renderbuffers ====================

pub(crate) fn create_renderbuffer(ctx: &mut RenderingContext, _: &Arguments<'_>) -> HandlerResult {
    create_object(ctx, ObjectKind::Renderbuffer)
}

pub(crate) fn delete_renderbuffer(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    delete_object(ctx, args, ObjectKind::Renderbuffer, "deleteRenderbuffer")
}

pub(crate) fn is_renderbuffer(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    is_object(ctx, args, ObjectKind::Renderbuffer)
}

pub(crate) fn bind_renderbuffer(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let target = args.u32(0)?;
    let renderbuffer = args.object(1, ObjectKind::Renderbuffer)?;
    let validator = ctx.validator();
    if validator.enum_in("bindRenderbuffer", target, &[RENDERBUFFER], "invalid target")
        && validator.validate_object("bindRenderbuffer", renderbuffer.as_ref())
    {
        ctx.driver()
            .bind_renderbuffer(target, id_of(renderbuffer.as_ref()));
    }
    Ok(JsValue::Undefined)
}

/// WebGL renderbuffer formats mapped to what the driver stores.
fn renderbuffer_format(internal_format: u32) -> Option<u32> {
    Some(match internal_format {
        DEPTH_STENCIL => DEPTH24_STENCIL8,
        DEPTH_COMPONENT16 => DEPTH_COMPONENT,
        RGBA4 | RGB5_A1 => RGBA,
        RGB565 => RGB,
        STENCIL_INDEX8 => STENCIL_INDEX8,
        _ => return None,
    })
}

pub(crate) fn renderbuffer_storage(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (target, internal_format) = (args.u32(0)?, args.u32(1)?);
    let (width, height) = (args.i32(2)?, args.i32(3)?);
    let caller = "renderbufferStorage";
    if !ctx
        .validator()
        .enum_in(caller, target, &[RENDERBUFFER], "invalid target")
    {
        return Ok(JsValue::Undefined);
    }
    let Some(format) = renderbuffer_format(internal_format) else {
        debug!(internal_format, "renderbufferStorage: invalid format");
        ctx.set_error(INVALID_ENUM);
        return Ok(JsValue::Undefined);
    };
    if width < 0 || height < 0 {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    ctx.driver()
        .renderbuffer_storage(target, format, width, height);
    Ok(JsValue::Undefined)
}

pub(crate) fn get_renderbuffer_parameter(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (target, pname) = (args.u32(0)?, args.u32(1)?);
    let caller = "getRenderbufferParameter";
    let validator = ctx.validator();
    if !validator.enum_in(caller, target, &[RENDERBUFFER], "invalid target")
        || !validator.enum_in(
            caller,
            pname,
            &[
                RENDERBUFFER_WIDTH,
                RENDERBUFFER_HEIGHT,
                RENDERBUFFER_INTERNAL_FORMAT,
                RENDERBUFFER_RED_SIZE,
                RENDERBUFFER_GREEN_SIZE,
                RENDERBUFFER_BLUE_SIZE,
                RENDERBUFFER_ALPHA_SIZE,
                RENDERBUFFER_DEPTH_SIZE,
                RENDERBUFFER_STENCIL_SIZE,
            ],
            "invalid renderbuffer parameter",
        )
    {
        return Ok(JsValue::Null);
    }
    Ok(ctx
        .driver()
        .get_renderbuffer_parameter_iv(target, pname)
        .into())
}

// ==================== Readback ====================

/// `readPixels(x, y, width, height, format, type, pixels)`.
///
/// Only RGBA/UNSIGNED_BYTE into a `Uint8Array` large enough for the
/// pack-aligned rows.
pub(crate) fn read_pixels(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (x, y) = (args.i32(0)?, args.i32(1)?);
    let (width, height) = (args.i32(2)?, args.i32(3)?);
    let (format, type_) = (args.u32(4)?, args.u32(5)?);
    let pixels = args.typed_array(6)?;
    if let Some(array) = &pixels {
        if array.kind() != TypedArrayKind::Uint8 {
            return Err(TypeError::new("Uint8Array", array.kind().name()).at(6));
        }
    }

    if format != RGBA || type_ != UNSIGNED_BYTE {
        debug!(format, type_, "readPixels: only RGBA/UNSIGNED_BYTE");
        ctx.set_error(INVALID_OPERATION);
        return Ok(JsValue::Undefined);
    }
    let Some(pixels) = pixels else {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    };
    if width < 0 || height < 0 {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }

    let row = align_up(width as usize * 4, ctx.pixel_store.pack_alignment as usize);
    let needed = row * height as usize;
    if pixels.byte_length() < needed {
        debug!(needed, available = pixels.byte_length(), "readPixels: buffer too small");
        ctx.set_error(INVALID_OPERATION);
        return Ok(JsValue::Undefined);
    }

    let driver = ctx.driver();
    pixels.with_bytes_mut(|bytes| {
        driver.read_pixels(x, y, width, height, format, type_, &mut bytes[..needed])
    });
    Ok(JsValue::Undefined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderbuffer_format_remap() {
        assert_eq!(renderbuffer_format(DEPTH_STENCIL), Some(DEPTH24_STENCIL8));
        assert_eq!(renderbuffer_format(DEPTH_COMPONENT16), Some(DEPTH_COMPONENT));
        assert_eq!(renderbuffer_format(RGB5_A1), Some(RGBA));
        assert_eq!(renderbuffer_format(RGB565), Some(RGB));
        assert_eq!(renderbuffer_format(STENCIL_INDEX8), Some(STENCIL_INDEX8));
        assert_eq!(renderbuffer_format(RGBA), None);
    }
}
