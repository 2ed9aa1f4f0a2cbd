//! Vertex attributes and draw calls.

use tracing::debug;

use super::HandlerResult;
use crate::array_call::{process_array_call, VertexAttribVector};
use crate::constants::*;
use crate::context::RenderingContext;
use crate::marshal::Arguments;
use crate::objects::ObjectKind;
use crate::{JsValue, TypedArray};

/// Attribute index below MAX_VERTEX_ATTRIBS, else INVALID_VALUE.
pub(crate) fn check_attrib_index(ctx: &RenderingContext, caller: &str, index: u32) -> bool {
    let max = ctx.integer(MAX_VERTEX_ATTRIBS).max(0) as u32;
    if index >= max {
        debug!(caller, index, max, "Vertex attribute index out of range");
        ctx.set_error(INVALID_VALUE);
        return false;
    }
    true
}

fn type_size(type_: u32) -> Option<i32> {
    match type_ {
        BYTE | UNSIGNED_BYTE => Some(1),
        SHORT | UNSIGNED_SHORT => Some(2),
        FLOAT => Some(4),
        _ => None,
    }
}

pub(crate) fn enable_vertex_attrib_array(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let index = args.u32(0)?;
    if check_attrib_index(ctx, "enableVertexAttribArray", index) {
        ctx.driver().enable_vertex_attrib_array(index);
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn disable_vertex_attrib_array(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let index = args.u32(0)?;
    if check_attrib_index(ctx, "disableVertexAttribArray", index) {
        ctx.driver().disable_vertex_attrib_array(index);
    }
    Ok(JsValue::Undefined)
}

// ==================== Constant attributes ====================

macro_rules! vertex_attrib_scalars {
    ($($handler:ident, $method:literal, $driver:ident, [$($arg:ident = $i:literal),+];)*) => {$(
        pub(crate) fn $handler(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
            let index = args.u32(0)?;
            $(let $arg = args.f32($i)?;)+
            if check_attrib_index(ctx, $method, index) {
                ctx.driver().$driver(index, $($arg),+);
            }
            Ok(JsValue::Undefined)
        }
    )*};
}

macro_rules! vertex_attrib_vectors {
    ($($handler:ident, $method:literal, $len:literal, $driver:ident;)*) => {$(
        pub(crate) fn $handler(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
            process_array_call(
                ctx,
                args,
                VertexAttribVector::new($method, $len, |driver, index, values| {
                    driver.$driver(index, values)
                }),
            )
        }
    )*};
}

vertex_attrib_scalars! {
    vertex_attrib_1f, "vertexAttrib1f", vertex_attrib_1f, [x = 1];
    vertex_attrib_2f, "vertexAttrib2f", vertex_attrib_2f, [x = 1, y = 2];
    vertex_attrib_3f, "vertexAttrib3f", vertex_attrib_3f, [x = 1, y = 2, z = 3];
    vertex_attrib_4f, "vertexAttrib4f", vertex_attrib_4f, [x = 1, y = 2, z = 3, w = 4];
}

vertex_attrib_vectors! {
    vertex_attrib_1fv, "vertexAttrib1fv", 1, vertex_attrib_1fv;
    vertex_attrib_2fv, "vertexAttrib2fv", 2, vertex_attrib_2fv;
    vertex_attrib_3fv, "vertexAttrib3fv", 3, vertex_attrib_3fv;
    vertex_attrib_4fv, "vertexAttrib4fv", 4, vertex_attrib_4fv;
}

// ==================== Arrays ====================

/// `vertexAttribPointer(index, size, type, normalized, stride, offset)`.
pub(crate) fn vertex_attrib_pointer(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (index, size, type_) = (args.u32(0)?, args.i32(1)?, args.u32(2)?);
    let normalized = args.bool(3);
    let (stride, offset) = (args.i32(4)?, args.isize(5)?);

    let caller = "vertexAttribPointer";
    if !check_attrib_index(ctx, caller, index) {
        return Ok(JsValue::Undefined);
    }
    let Some(type_size) = type_size(type_) else {
        debug!(type_, "vertexAttribPointer: invalid type");
        ctx.set_error(INVALID_ENUM);
        return Ok(JsValue::Undefined);
    };
    if !(1..=4).contains(&size) || !(0..=255).contains(&stride) || offset < 0 {
        debug!(size, stride, offset, "vertexAttribPointer: value out of range");
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    if stride % type_size != 0 || offset % type_size as isize != 0 {
        debug!(stride, offset, type_size, "vertexAttribPointer: misaligned");
        ctx.set_error(INVALID_OPERATION);
        return Ok(JsValue::Undefined);
    }
    ctx.driver()
        .vertex_attrib_pointer(index, size, type_, normalized, stride, offset);
    Ok(JsValue::Undefined)
}

pub(crate) fn get_vertex_attrib(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (index, pname) = (args.u32(0)?, args.u32(1)?);
    if !check_attrib_index(ctx, "getVertexAttrib", index) {
        return Ok(JsValue::Null);
    }
    let driver = ctx.driver();
    Ok(match pname {
        VERTEX_ATTRIB_ARRAY_BUFFER_BINDING => {
            let buffer = driver.get_vertex_attrib_iv(index, pname) as u32;
            ctx.lookup_js(ObjectKind::Buffer, buffer)
        }
        VERTEX_ATTRIB_ARRAY_ENABLED | VERTEX_ATTRIB_ARRAY_NORMALIZED => {
            (driver.get_vertex_attrib_iv(index, pname) != 0).into()
        }
        VERTEX_ATTRIB_ARRAY_SIZE | VERTEX_ATTRIB_ARRAY_STRIDE | VERTEX_ATTRIB_ARRAY_TYPE => {
            driver.get_vertex_attrib_iv(index, pname).into()
        }
        CURRENT_VERTEX_ATTRIB => {
            let mut values = [0.0_f32; 4];
            driver.get_vertex_attrib_fv(index, pname, &mut values);
            TypedArray::from_slice(&values).into()
        }
        _ => {
            debug!(pname, "getVertexAttrib: invalid parameter");
            ctx.set_error(INVALID_ENUM);
            JsValue::Null
        }
    })
}

pub(crate) fn get_vertex_attrib_offset(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (index, pname) = (args.u32(0)?, args.u32(1)?);
    let caller = "getVertexAttribOffset";
    if !check_attrib_index(ctx, caller, index)
        || !ctx.validator().enum_in(
            caller,
            pname,
            &[VERTEX_ATTRIB_ARRAY_POINTER],
            "invalid parameter",
        )
    {
        return Ok(0.into());
    }
    Ok((ctx.driver().get_vertex_attrib_offset(index, pname) as f64).into())
}

// ==================== Drawing ====================

pub(crate) fn draw_arrays(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (mode, first, count) = (args.u32(0)?, args.i32(1)?, args.i32(2)?);
    if !ctx.validator().draw_mode("drawArrays", mode) {
        return Ok(JsValue::Undefined);
    }
    if first < 0 || count < 0 {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    ctx.driver().draw_arrays(mode, first, count);
    Ok(JsValue::Undefined)
}

/// `drawElements(mode, count, type, offset)`; the offset is a byte offset
/// into the bound element buffer.
pub(crate) fn draw_elements(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (mode, count, type_) = (args.u32(0)?, args.i32(1)?, args.u32(2)?);
    let offset = args.isize(3)?;
    let caller = "drawElements";
    let validator = ctx.validator();
    if !validator.draw_mode(caller, mode)
        || !validator.enum_in(
            caller,
            type_,
            &[UNSIGNED_BYTE, UNSIGNED_SHORT],
            "invalid index type",
        )
    {
        return Ok(JsValue::Undefined);
    }
    if count < 0 || offset < 0 {
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    if type_ == UNSIGNED_SHORT && offset % 2 != 0 {
        debug!(offset, "drawElements: offset not a multiple of the index size");
        ctx.set_error(INVALID_OPERATION);
        return Ok(JsValue::Undefined);
    }
    ctx.driver().draw_elements(mode, count, type_, offset);
    Ok(JsValue::Undefined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_size() {
        assert_eq!(type_size(FLOAT), Some(4));
        assert_eq!(type_size(UNSIGNED_SHORT), Some(2));
        assert_eq!(type_size(BYTE), Some(1));
        assert_eq!(type_size(INT), None);
    }
}
