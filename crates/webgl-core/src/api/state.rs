//! Context queries and fixed-function state.

use std::rc::Rc;

use tracing::debug;

use super::HandlerResult;
use crate::constants::*;
use crate::context::RenderingContext;
use crate::marshal::Arguments;
use crate::{JsObject, JsValue};

const STENCIL_OPS: [u32; 8] = [KEEP, ZERO, REPLACE, INCR, INCR_WRAP, DECR, DECR_WRAP, INVERT];

// ==================== Context ====================

pub(crate) fn get_context_attributes(ctx: &mut RenderingContext, _: &Arguments<'_>) -> HandlerResult {
    Ok(JsValue::Object(JsObject::new(Rc::new(ctx.config().attributes))))
}

pub(crate) fn is_context_lost(_: &mut RenderingContext, _: &Arguments<'_>) -> HandlerResult {
    Ok(false.into())
}

pub(crate) fn get_supported_extensions(_: &mut RenderingContext, _: &Arguments<'_>) -> HandlerResult {
    Ok(JsValue::Array(Vec::new()))
}

pub(crate) fn get_extension(_: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let name = args.string(0)?;
    debug!(name = %name, "Extension requested");
    Ok(JsValue::Null)
}

pub(crate) fn get_error(ctx: &mut RenderingContext, _: &Arguments<'_>) -> HandlerResult {
    Ok(ctx.take_error().into())
}

pub(crate) fn finish(ctx: &mut RenderingContext, _: &Arguments<'_>) -> HandlerResult {
    ctx.driver().finish();
    Ok(JsValue::Undefined)
}

pub(crate) fn flush(ctx: &mut RenderingContext, _: &Arguments<'_>) -> HandlerResult {
    ctx.driver().flush();
    Ok(JsValue::Undefined)
}

// ==================== Blending ====================

pub(crate) fn blend_color(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (r, g, b, a) = (args.f32(0)?, args.f32(1)?, args.f32(2)?, args.f32(3)?);
    ctx.driver().blend_color(r, g, b, a);
    Ok(JsValue::Undefined)
}

pub(crate) fn blend_equation(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let mode = args.u32(0)?;
    if ctx.validator().blend_equation("blendEquation", mode) {
        ctx.driver().blend_equation(mode);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn blend_equation_separate(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (rgb, alpha) = (args.u32(0)?, args.u32(1)?);
    let validator = ctx.validator();
    if validator.blend_equation("blendEquationSeparate", rgb)
        && validator.blend_equation("blendEquationSeparate", alpha)
    {
        ctx.driver().blend_equation_separate(rgb, alpha);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn blend_func(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (src, dst) = (args.u32(0)?, args.u32(1)?);
    let caller = "blendFunc";
    let validator = ctx.validator();
    if validator.blend_factor(caller, src, true)
        && validator.blend_factor(caller, dst, false)
        && validator.blend_func_factors(caller, src, dst)
    {
        ctx.driver().blend_func(src, dst);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn blend_func_separate(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (src_rgb, dst_rgb) = (args.u32(0)?, args.u32(1)?);
    let (src_alpha, dst_alpha) = (args.u32(2)?, args.u32(3)?);
    let caller = "blendFuncSeparate";
    let validator = ctx.validator();
    if validator.blend_factor(caller, src_rgb, true)
        && validator.blend_factor(caller, dst_rgb, false)
        && validator.blend_factor(caller, src_alpha, true)
        && validator.blend_factor(caller, dst_alpha, false)
        && validator.blend_func_factors(caller, src_rgb, dst_rgb)
    {
        ctx.driver()
            .blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha);
    }
    Ok(JsValue::Undefined)
}

// ==================== Clearing and masks ====================

pub(crate) fn clear(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let mask = args.u32(0)?;
    if mask & !(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT | STENCIL_BUFFER_BIT) != 0 {
        debug!(mask, "clear: unknown mask bits");
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    ctx.driver().clear(mask);
    Ok(JsValue::Undefined)
}

pub(crate) fn clear_color(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (r, g, b, a) = (args.f32(0)?, args.f32(1)?, args.f32(2)?, args.f32(3)?);
    ctx.driver().clear_color(r, g, b, a);
    Ok(JsValue::Undefined)
}

pub(crate) fn clear_depth(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let depth = args.f32(0)?;
    ctx.driver().clear_depth(depth);
    Ok(JsValue::Undefined)
}

pub(crate) fn clear_stencil(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let s = args.i32(0)?;
    ctx.driver().clear_stencil(s);
    Ok(JsValue::Undefined)
}

pub(crate) fn color_mask(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    ctx.driver()
        .color_mask(args.bool(0), args.bool(1), args.bool(2), args.bool(3));
    Ok(JsValue::Undefined)
}

pub(crate) fn depth_mask(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    ctx.driver().depth_mask(args.bool(0));
    Ok(JsValue::Undefined)
}

// ==================== Depth, culling, capabilities ====================

pub(crate) fn cull_face(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let mode = args.u32(0)?;
    if ctx.validator().stencil_face("cullFace", mode) {
        ctx.driver().cull_face(mode);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn front_face(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let mode = args.u32(0)?;
    if ctx
        .validator()
        .enum_in("frontFace", mode, &[CW, CCW], "invalid winding")
    {
        ctx.driver().front_face(mode);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn depth_func(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let func = args.u32(0)?;
    if ctx.validator().stencil_func("depthFunc", func) {
        ctx.driver().depth_func(func);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn depth_range(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (near, far) = (args.f32(0)?, args.f32(1)?);
    if near > far {
        ctx.set_error(INVALID_OPERATION);
        return Ok(JsValue::Undefined);
    }
    ctx.driver().depth_range(near, far);
    Ok(JsValue::Undefined)
}

pub(crate) fn enable(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let cap = args.u32(0)?;
    if ctx.validator().capability("enable", cap) {
        ctx.driver().enable(cap);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn disable(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let cap = args.u32(0)?;
    if ctx.validator().capability("disable", cap) {
        ctx.driver().disable(cap);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn is_enabled(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let cap = args.u32(0)?;
    if !ctx.validator().capability("isEnabled", cap) {
        return Ok(false.into());
    }
    Ok(ctx.driver().is_enabled(cap).into())
}

// ==================== Rasterization ====================

pub(crate) fn hint(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (target, mode) = (args.u32(0)?, args.u32(1)?);
    let validator = ctx.validator();
    if validator.enum_in("hint", target, &[GENERATE_MIPMAP_HINT], "invalid hint target")
        && validator.enum_in("hint", mode, &[FASTEST, NICEST, DONT_CARE], "invalid hint mode")
    {
        ctx.driver().hint(target, mode);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn line_width(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let width = args.f32(0)?;
    if width.is_nan() || width <= 0.0 {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    ctx.driver().line_width(width);
    Ok(JsValue::Undefined)
}

pub(crate) fn pixel_storei(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (pname, param) = (args.u32(0)?, args.i32(1)?);
    match pname {
        UNPACK_FLIP_Y_WEBGL => ctx.pixel_store.flip_y = param != 0,
        UNPACK_PREMULTIPLY_ALPHA_WEBGL => ctx.pixel_store.premultiply_alpha = param != 0,
        UNPACK_COLORSPACE_CONVERSION_WEBGL => {
            let param = param as u32;
            if !ctx.validator().enum_in(
                "pixelStorei",
                param,
                &[BROWSER_DEFAULT_WEBGL, NONE],
                "invalid colorspace conversion",
            ) {
                return Ok(JsValue::Undefined);
            }
            ctx.pixel_store.colorspace_conversion = param;
        }
        PACK_ALIGNMENT | UNPACK_ALIGNMENT => {
            if !matches!(param, 1 | 2 | 4 | 8) {
                debug!(pname, param, "pixelStorei: bad alignment");
                ctx.set_error(INVALID_VALUE);
                return Ok(JsValue::Undefined);
            }
            if pname == PACK_ALIGNMENT {
                ctx.pixel_store.pack_alignment = param;
            } else {
                ctx.pixel_store.unpack_alignment = param;
            }
            ctx.driver().pixel_store_i(pname, param);
        }
        _ => {
            debug!(pname, "pixelStorei: unknown parameter");
            ctx.set_error(INVALID_ENUM);
        }
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn polygon_offset(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (factor, units) = (args.f32(0)?, args.f32(1)?);
    ctx.driver().polygon_offset(factor, units);
    Ok(JsValue::Undefined)
}

pub(crate) fn sample_coverage(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let value = args.f32(0)?;
    ctx.driver().sample_coverage(value, args.bool(1));
    Ok(JsValue::Undefined)
}

pub(crate) fn scissor(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (x, y, w, h) = (args.i32(0)?, args.i32(1)?, args.i32(2)?, args.i32(3)?);
    if w < 0 || h < 0 {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    ctx.driver().scissor(x, y, w, h);
    Ok(JsValue::Undefined)
}

pub(crate) fn viewport(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (x, y, w, h) = (args.i32(0)?, args.i32(1)?, args.i32(2)?, args.i32(3)?);
    if w < 0 || h < 0 {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    ctx.driver().viewport(x, y, w, h);
    Ok(JsValue::Undefined)
}

// ==================== Stencil ====================

pub(crate) fn stencil_func(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (func, reference, mask) = (args.u32(0)?, args.i32(1)?, args.u32(2)?);
    if ctx.validator().stencil_func("stencilFunc", func) {
        ctx.driver().stencil_func(func, reference, mask);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn stencil_func_separate(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (face, func) = (args.u32(0)?, args.u32(1)?);
    let (reference, mask) = (args.i32(2)?, args.u32(3)?);
    let validator = ctx.validator();
    if validator.stencil_face("stencilFuncSeparate", face)
        && validator.stencil_func("stencilFuncSeparate", func)
    {
        ctx.driver()
            .stencil_func_separate(face, func, reference, mask);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn stencil_mask(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let mask = args.u32(0)?;
    ctx.driver().stencil_mask(mask);
    Ok(JsValue::Undefined)
}

pub(crate) fn stencil_mask_separate(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (face, mask) = (args.u32(0)?, args.u32(1)?);
    if ctx.validator().stencil_face("stencilMaskSeparate", face) {
        ctx.driver().stencil_mask_separate(face, mask);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn stencil_op(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (fail, zfail, zpass) = (args.u32(0)?, args.u32(1)?, args.u32(2)?);
    let validator = ctx.validator();
    if [fail, zfail, zpass]
        .iter()
        .all(|op| validator.enum_in("stencilOp", *op, &STENCIL_OPS, "invalid stencil op"))
    {
        ctx.driver().stencil_op(fail, zfail, zpass);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn stencil_op_separate(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let face = args.u32(0)?;
    let (fail, zfail, zpass) = (args.u32(1)?, args.u32(2)?, args.u32(3)?);
    let validator = ctx.validator();
    let ops_ok = || {
        [fail, zfail, zpass].iter().all(|op| {
            validator.enum_in("stencilOpSeparate", *op, &STENCIL_OPS, "invalid stencil op")
        })
    };
    if validator.stencil_face("stencilOpSeparate", face) && ops_ok() {
        ctx.driver().stencil_op_separate(face, fail, zfail, zpass);
    }
    Ok(JsValue::Undefined)
}
