//! WebGL method handlers, grouped by area.
//!
//! Every handler has the [`Handler`](crate::dispatch::Handler) signature:
//! decode all arguments first (a decode failure returns `Err` with no side
//! effect), then validate, then call the driver and encode the result.

use std::rc::Rc;

use crate::context::{delete_native, RenderingContext};
use crate::marshal::Arguments;
use crate::objects::{ObjectKind, WebGLObject};
use crate::{JsValue, TypeError};

pub(crate) mod buffers;
pub(crate) mod framebuffers;
pub(crate) mod programs;
pub(crate) mod state;
pub(crate) mod textures;
pub(crate) mod uniforms;
pub(crate) mod vertex;

pub(crate) type HandlerResult = Result<JsValue, TypeError>;

/// Native id of an optional wrapper; `null` is 0.
pub(crate) fn id_of(object: Option<&Rc<WebGLObject>>) -> u32 {
    object.map_or(0, |object| object.webgl_id())
}

/// `createX()` for the named kinds except shaders.
pub(crate) fn create_object(ctx: &mut RenderingContext, kind: ObjectKind) -> HandlerResult {
    let driver = ctx.driver();
    let id = match kind {
        ObjectKind::Buffer => driver.gen_buffer(),
        ObjectKind::Framebuffer => driver.gen_framebuffer(),
        ObjectKind::Renderbuffer => driver.gen_renderbuffer(),
        ObjectKind::Program => driver.create_program(),
        ObjectKind::Texture => driver.gen_texture(),
        _ => 0,
    };
    if id == 0 {
        return Ok(JsValue::Null);
    }
    Ok(ctx.registry_mut().create(kind, id).to_js())
}

/// `deleteX(object)`. `null` forwards id 0 to the driver.
pub(crate) fn delete_object(
    ctx: &mut RenderingContext,
    args: &Arguments<'_>,
    kind: ObjectKind,
    caller: &str,
) -> HandlerResult {
    let object = args.object(0, kind)?;
    if !ctx.validator().validate_object(caller, object.as_ref()) {
        return Ok(JsValue::Undefined);
    }
    let id = match &object {
        Some(object) => {
            if kind == ObjectKind::Program && object.webgl_id() == ctx.current_program {
                ctx.retired_program = Some(Rc::clone(object));
            }
            ctx.registry_mut().delete(object)
        }
        None => 0,
    };
    delete_native(ctx.driver(), kind, id);
    Ok(JsValue::Undefined)
}

/// `isX(object)`: false for null, deleted and foreign wrappers without
/// asking the driver.
pub(crate) fn is_object(
    ctx: &RenderingContext,
    args: &Arguments<'_>,
    kind: ObjectKind,
) -> HandlerResult {
    let Some(object) = args.object(0, kind)? else {
        return Ok(false.into());
    };
    if object.context() != ctx.id() || object.is_deleted() {
        return Ok(false.into());
    }
    let driver = ctx.driver();
    let id = object.webgl_id();
    let live = match kind {
        ObjectKind::Buffer => driver.is_buffer(id),
        ObjectKind::Framebuffer => driver.is_framebuffer(id),
        ObjectKind::Renderbuffer => driver.is_renderbuffer(id),
        ObjectKind::Program => driver.is_program(id),
        ObjectKind::Shader => driver.is_shader(id),
        ObjectKind::Texture => driver.is_texture(id),
        ObjectKind::UniformLocation | ObjectKind::ActiveInfo => false,
    };
    Ok(live.into())
}

/// Decode an object argument that must be a live wrapper of this context.
/// `Ok(None)` means validation failed and an error was posted, so callers
/// decode their other arguments first.
pub(crate) fn required_object(
    ctx: &RenderingContext,
    args: &Arguments<'_>,
    index: usize,
    kind: ObjectKind,
    caller: &str,
) -> Result<Option<Rc<WebGLObject>>, TypeError> {
    let object = args.object(index, kind)?;
    Ok(ctx
        .validator()
        .require_valid_object(caller, object.as_ref())
        .then_some(object)
        .flatten())
}

/// Round `value` up to a multiple of `alignment`.
pub(crate) fn align_up(value: usize, alignment: usize) -> usize {
    let alignment = alignment.max(1);
    value.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(6, 4), 8);
        assert_eq!(align_up(8, 4), 8);
        assert_eq!(align_up(3, 1), 3);
        assert_eq!(align_up(0, 8), 0);
    }
}
