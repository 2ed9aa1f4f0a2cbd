//! Buffer objects.

use tracing::debug;

use super::{create_object, delete_object, id_of, is_object, HandlerResult};
use crate::constants::*;
use crate::context::RenderingContext;
use crate::marshal::Arguments;
use crate::objects::ObjectKind;
use crate::JsValue;

pub(crate) fn create_buffer(ctx: &mut RenderingContext, _: &Arguments<'_>) -> HandlerResult {
    create_object(ctx, ObjectKind::Buffer)
}

pub(crate) fn delete_buffer(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    delete_object(ctx, args, ObjectKind::Buffer, "deleteBuffer")
}

pub(crate) fn is_buffer(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    is_object(ctx, args, ObjectKind::Buffer)
}

pub(crate) fn bind_buffer(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let target = args.u32(0)?;
    let buffer = args.object(1, ObjectKind::Buffer)?;
    let validator = ctx.validator();
    if validator.buffer_target("bindBuffer", target)
        && validator.validate_object("bindBuffer", buffer.as_ref())
    {
        ctx.driver().bind_buffer(target, id_of(buffer.as_ref()));
    }
    Ok(JsValue::Undefined)
}

/// `bufferData(target, size, usage)` or `bufferData(target, data, usage)`.
pub(crate) fn buffer_data(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let target = args.u32(0)?;
    let usage = args.u32(2)?;
    let data = args.get(1);
    // Null data is rejected before the target and usage are looked at.
    if data.is_nullish() {
        debug!("bufferData: data is null");
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    let (array, size) = match data {
        JsValue::TypedArray(array) => (Some(array), 0),
        _ => (None, args.isize(1)?),
    };

    if !ctx
        .validator()
        .buffer_data_parameters("bufferData", target, usage)
    {
        return Ok(JsValue::Undefined);
    }

    let driver = ctx.driver();
    match array {
        Some(array) => array.with_bytes(|bytes| {
            driver.buffer_data(target, bytes.len() as isize, Some(bytes), usage)
        }),
        None if size < 0 => {
            debug!(size, "bufferData: negative size");
            ctx.set_error(INVALID_VALUE);
        }
        None => driver.buffer_data(target, size, None, usage),
    }
    Ok(JsValue::Undefined)
}

/// Only typed-array data is uploaded; anything else is ignored.
pub(crate) fn buffer_sub_data(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let target = args.u32(0)?;
    let offset = args.isize(1)?;
    if !ctx.validator().buffer_target("bufferSubData", target) {
        return Ok(JsValue::Undefined);
    }
    let JsValue::TypedArray(array) = args.get(2) else {
        return Ok(JsValue::Undefined);
    };
    if offset < 0 {
        debug!(offset, "bufferSubData: negative offset");
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    }
    let driver = ctx.driver();
    array.with_bytes(|bytes| driver.buffer_sub_data(target, offset, bytes));
    Ok(JsValue::Undefined)
}

pub(crate) fn get_buffer_parameter(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (target, pname) = (args.u32(0)?, args.u32(1)?);
    let validator = ctx.validator();
    if !validator.buffer_target("getBufferParameter", target)
        || !validator.enum_in(
            "getBufferParameter",
            pname,
            &[BUFFER_SIZE, BUFFER_USAGE],
            "invalid buffer parameter",
        )
    {
        return Ok(JsValue::Null);
    }
    Ok(ctx.driver().get_buffer_parameter_iv(target, pname).into())
}
