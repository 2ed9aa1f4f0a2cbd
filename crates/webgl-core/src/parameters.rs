//! `getParameter`.
//!
//! Each pname maps to a [`ParamKind`] that picks the driver getter and the
//! shape of the returned value.

use tracing::warn;

use crate::api::HandlerResult;
use crate::constants::*;
use crate::context::RenderingContext;
use crate::marshal::Arguments;
use crate::objects::ObjectKind;
use crate::{JsValue, TypedArray, TypedArrayKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKind {
    Bool,
    BoolArray(usize),
    Int,
    /// Masks reported as unsigned.
    Uint,
    Float,
    FloatArray(usize),
    IntArray(usize),
    Object(ObjectKind),
    String,
    /// Answered from context state.
    Local,
}

fn param_kind(pname: u32) -> Option<ParamKind> {
    use ParamKind::*;

    Some(match pname {
        BLEND | CULL_FACE | DEPTH_TEST | DITHER | POLYGON_OFFSET_FILL
        | SAMPLE_ALPHA_TO_COVERAGE | SAMPLE_COVERAGE | SCISSOR_TEST | STENCIL_TEST
        | DEPTH_WRITEMASK | SAMPLE_COVERAGE_INVERT => Bool,

        COLOR_WRITEMASK => BoolArray(4),

        ACTIVE_TEXTURE | ALPHA_BITS | BLUE_BITS | DEPTH_BITS | GREEN_BITS | RED_BITS
        | STENCIL_BITS | SUBPIXEL_BITS | SAMPLE_BUFFERS | SAMPLES | BLEND_DST_ALPHA
        | BLEND_DST_RGB | BLEND_SRC_ALPHA | BLEND_SRC_RGB | BLEND_EQUATION_ALPHA
        | BLEND_EQUATION_RGB | CULL_FACE_MODE | DEPTH_FUNC | FRONT_FACE
        | GENERATE_MIPMAP_HINT | MAX_COMBINED_TEXTURE_IMAGE_UNITS
        | MAX_CUBE_MAP_TEXTURE_SIZE | MAX_FRAGMENT_UNIFORM_VECTORS
        | MAX_RENDERBUFFER_SIZE | MAX_TEXTURE_IMAGE_UNITS | MAX_TEXTURE_SIZE
        | MAX_VARYING_VECTORS | MAX_VERTEX_ATTRIBS | MAX_VERTEX_TEXTURE_IMAGE_UNITS
        | MAX_VERTEX_UNIFORM_VECTORS | PACK_ALIGNMENT | UNPACK_ALIGNMENT
        | STENCIL_BACK_FAIL | STENCIL_BACK_FUNC | STENCIL_BACK_PASS_DEPTH_FAIL
        | STENCIL_BACK_PASS_DEPTH_PASS | STENCIL_BACK_REF | STENCIL_CLEAR_VALUE
        | STENCIL_FAIL | STENCIL_FUNC | STENCIL_PASS_DEPTH_FAIL
        | STENCIL_PASS_DEPTH_PASS | STENCIL_REF => Int,

        STENCIL_VALUE_MASK | STENCIL_WRITEMASK | STENCIL_BACK_VALUE_MASK
        | STENCIL_BACK_WRITEMASK => Uint,

        DEPTH_CLEAR_VALUE | LINE_WIDTH | POLYGON_OFFSET_FACTOR | POLYGON_OFFSET_UNITS
        | SAMPLE_COVERAGE_VALUE => Float,

        ALIASED_LINE_WIDTH_RANGE | ALIASED_POINT_SIZE_RANGE | DEPTH_RANGE => FloatArray(2),
        BLEND_COLOR | COLOR_CLEAR_VALUE => FloatArray(4),

        MAX_VIEWPORT_DIMS => IntArray(2),
        SCISSOR_BOX | VIEWPORT => IntArray(4),

        ARRAY_BUFFER_BINDING | ELEMENT_ARRAY_BUFFER_BINDING => Object(ObjectKind::Buffer),
        CURRENT_PROGRAM => Object(ObjectKind::Program),
        FRAMEBUFFER_BINDING => Object(ObjectKind::Framebuffer),
        RENDERBUFFER_BINDING => Object(ObjectKind::Renderbuffer),
        TEXTURE_BINDING_2D | TEXTURE_BINDING_CUBE_MAP => Object(ObjectKind::Texture),

        VERSION | SHADING_LANGUAGE_VERSION => String,

        VENDOR | RENDERER | COMPRESSED_TEXTURE_FORMATS | UNPACK_FLIP_Y_WEBGL
        | UNPACK_PREMULTIPLY_ALPHA_WEBGL | UNPACK_COLORSPACE_CONVERSION_WEBGL => Local,

        _ => return None,
    })
}

fn local_parameter(ctx: &RenderingContext, pname: u32) -> JsValue {
    let store = ctx.pixel_store;
    match pname {
        VENDOR => ctx.config().vendor.clone().into(),
        RENDERER => ctx.config().renderer.clone().into(),
        COMPRESSED_TEXTURE_FORMATS => TypedArray::new(TypedArrayKind::Uint32, 0).into(),
        UNPACK_FLIP_Y_WEBGL => store.flip_y.into(),
        UNPACK_PREMULTIPLY_ALPHA_WEBGL => store.premultiply_alpha.into(),
        UNPACK_COLORSPACE_CONVERSION_WEBGL => store.colorspace_conversion.into(),
        _ => JsValue::Null,
    }
}

pub(crate) fn get_parameter(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let pname = args.u32(0)?;
    let Some(kind) = param_kind(pname) else {
        warn!(pname = format_args!("{:#06x}", pname), "getParameter: unknown parameter");
        ctx.set_error(INVALID_ENUM);
        return Ok(JsValue::Undefined);
    };

    let driver = ctx.driver();
    Ok(match kind {
        ParamKind::Bool => {
            let mut value = [false];
            driver.get_boolean_v(pname, &mut value);
            value[0].into()
        }
        ParamKind::BoolArray(len) => {
            let mut values = vec![false; len];
            driver.get_boolean_v(pname, &mut values);
            JsValue::Array(values.into_iter().map(JsValue::from).collect())
        }
        ParamKind::Int => ctx.integer(pname).into(),
        ParamKind::Uint => (ctx.integer(pname) as u32).into(),
        ParamKind::Float => {
            let mut value = [0.0];
            driver.get_float_v(pname, &mut value);
            value[0].into()
        }
        ParamKind::FloatArray(len) => {
            let mut values = vec![0.0_f32; len];
            driver.get_float_v(pname, &mut values);
            TypedArray::from_slice(&values).into()
        }
        ParamKind::IntArray(len) => {
            let mut values = vec![0_i32; len];
            driver.get_integer_v(pname, &mut values);
            TypedArray::from_slice(&values).into()
        }
        ParamKind::Object(kind) => ctx.lookup_js(kind, ctx.integer(pname) as u32),
        ParamKind::String => {
            let native = driver.get_string(pname);
            if pname == VERSION {
                format!("WebGL 1.0 ({})", native).into()
            } else {
                format!("WebGL GLSL ES 1.0 ({})", native).into()
            }
        }
        ParamKind::Local => local_parameter(ctx, pname),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_kinds() {
        assert_eq!(param_kind(BLEND), Some(ParamKind::Bool));
        assert_eq!(param_kind(VIEWPORT), Some(ParamKind::IntArray(4)));
        assert_eq!(param_kind(DEPTH_RANGE), Some(ParamKind::FloatArray(2)));
        assert_eq!(
            param_kind(CURRENT_PROGRAM),
            Some(ParamKind::Object(ObjectKind::Program))
        );
        assert_eq!(param_kind(STENCIL_WRITEMASK), Some(ParamKind::Uint));
        assert_eq!(param_kind(0xdead), None);
    }
}
