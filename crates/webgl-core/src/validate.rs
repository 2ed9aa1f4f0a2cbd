//! WebGL argument validation.
//!
//! Each check returns `true` when the arguments are acceptable. On failure
//! it posts exactly one error to the context's [`ErrorChannel`] and returns
//! `false`. Checks never call the driver. The `caller` tag names the WebGL
//! method and only appears in logs.

use std::rc::Rc;

use tracing::debug;

use crate::constants::*;
use crate::error::ErrorChannel;
use crate::objects::{ContextId, WebGLObject};

pub struct Validator<'a> {
    errors: &'a ErrorChannel,
    context: ContextId,
}

impl<'a> Validator<'a> {
    pub fn new(errors: &'a ErrorChannel, context: ContextId) -> Self {
        Self { errors, context }
    }

    fn fail(&self, caller: &str, code: u32, reason: &str) -> bool {
        debug!(caller, code, reason, "Validation failed");
        self.errors.set(code);
        false
    }

    fn check(&self, ok: bool, caller: &str, code: u32, reason: &str) -> bool {
        ok || self.fail(caller, code, reason)
    }

    /// Generic enum whitelist for parameters without a dedicated check.
    pub fn enum_in(&self, caller: &str, value: u32, accepted: &[u32], reason: &str) -> bool {
        self.check(accepted.contains(&value), caller, INVALID_ENUM, reason)
    }

    pub fn blend_equation(&self, caller: &str, mode: u32) -> bool {
        self.check(
            matches!(mode, FUNC_ADD | FUNC_SUBTRACT | FUNC_REVERSE_SUBTRACT),
            caller,
            INVALID_ENUM,
            "invalid blend equation",
        )
    }

    /// SRC_ALPHA_SATURATE is only a source factor.
    pub fn blend_factor(&self, caller: &str, factor: u32, source: bool) -> bool {
        let ok = match factor {
            ZERO
            | ONE
            | SRC_COLOR
            | ONE_MINUS_SRC_COLOR
            | DST_COLOR
            | ONE_MINUS_DST_COLOR
            | SRC_ALPHA
            | ONE_MINUS_SRC_ALPHA
            | DST_ALPHA
            | ONE_MINUS_DST_ALPHA
            | CONSTANT_COLOR
            | ONE_MINUS_CONSTANT_COLOR
            | CONSTANT_ALPHA
            | ONE_MINUS_CONSTANT_ALPHA => true,
            SRC_ALPHA_SATURATE => source,
            _ => false,
        };
        self.check(ok, caller, INVALID_ENUM, "invalid blend factor")
    }

    /// Constant color and constant alpha factors cannot be combined.
    pub fn blend_func_factors(&self, caller: &str, src: u32, dst: u32) -> bool {
        let color = |f: u32| matches!(f, CONSTANT_COLOR | ONE_MINUS_CONSTANT_COLOR);
        let alpha = |f: u32| matches!(f, CONSTANT_ALPHA | ONE_MINUS_CONSTANT_ALPHA);
        self.check(
            !((color(src) && alpha(dst)) || (alpha(src) && color(dst))),
            caller,
            INVALID_ENUM,
            "constant color and constant alpha factors combined",
        )
    }

    pub fn capability(&self, caller: &str, cap: u32) -> bool {
        self.check(
            matches!(
                cap,
                BLEND
                    | CULL_FACE
                    | DEPTH_TEST
                    | DITHER
                    | POLYGON_OFFSET_FILL
                    | SAMPLE_ALPHA_TO_COVERAGE
                    | SAMPLE_COVERAGE
                    | SCISSOR_TEST
                    | STENCIL_TEST
            ),
            caller,
            INVALID_ENUM,
            "invalid capability",
        )
    }

    pub fn draw_mode(&self, caller: &str, mode: u32) -> bool {
        self.check(
            matches!(
                mode,
                POINTS | LINE_STRIP | LINE_LOOP | LINES | TRIANGLE_STRIP | TRIANGLE_FAN | TRIANGLES
            ),
            caller,
            INVALID_ENUM,
            "invalid draw mode",
        )
    }

    pub fn stencil_func(&self, caller: &str, func: u32) -> bool {
        self.check(
            matches!(
                func,
                NEVER | LESS | EQUAL | LEQUAL | GREATER | NOTEQUAL | GEQUAL | ALWAYS
            ),
            caller,
            INVALID_ENUM,
            "invalid stencil function",
        )
    }

    pub fn stencil_face(&self, caller: &str, face: u32) -> bool {
        self.check(
            matches!(face, FRONT | BACK | FRONT_AND_BACK),
            caller,
            INVALID_ENUM,
            "invalid face",
        )
    }

    /// Bind targets, or with `faces` the image targets: `TEXTURE_2D` and the
    /// six cube-map faces.
    pub fn texture_binding(&self, caller: &str, target: u32, faces: bool) -> bool {
        let ok = if faces {
            target == TEXTURE_2D || is_cube_map_face(target)
        } else {
            matches!(target, TEXTURE_2D | TEXTURE_CUBE_MAP)
        };
        self.check(ok, caller, INVALID_ENUM, "invalid texture target")
    }

    pub fn tex_parameter(&self, caller: &str, pname: u32, param: i32) -> bool {
        let param = param as u32;
        let ok = match pname {
            TEXTURE_MIN_FILTER => matches!(
                param,
                NEAREST
                    | LINEAR
                    | NEAREST_MIPMAP_NEAREST
                    | LINEAR_MIPMAP_NEAREST
                    | NEAREST_MIPMAP_LINEAR
                    | LINEAR_MIPMAP_LINEAR
            ),
            TEXTURE_MAG_FILTER => matches!(param, NEAREST | LINEAR),
            TEXTURE_WRAP_S | TEXTURE_WRAP_T => {
                matches!(param, REPEAT | CLAMP_TO_EDGE | MIRRORED_REPEAT)
            }
            _ => return self.fail(caller, INVALID_ENUM, "invalid texture parameter name"),
        };
        self.check(ok, caller, INVALID_ENUM, "invalid texture parameter value")
    }

    /// Format and type of pixel data handed to the texture upload calls.
    pub fn tex_format_and_type(&self, caller: &str, format: u32, type_: u32) -> bool {
        if !matches!(format, ALPHA | LUMINANCE | LUMINANCE_ALPHA | RGB | RGBA) {
            return self.fail(caller, INVALID_ENUM, "invalid texture format");
        }
        let ok = match type_ {
            UNSIGNED_BYTE => true,
            UNSIGNED_SHORT_5_6_5 => format == RGB,
            UNSIGNED_SHORT_4_4_4_4 | UNSIGNED_SHORT_5_5_5_1 => format == RGBA,
            _ => return self.fail(caller, INVALID_ENUM, "invalid texture type"),
        };
        self.check(ok, caller, INVALID_OPERATION, "type does not match format")
    }

    #[allow(clippy::too_many_arguments)]
    pub fn tex_func_parameters(
        &self,
        caller: &str,
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        border: i32,
        format: u32,
        type_: u32,
    ) -> bool {
        if !self.tex_format_and_type(caller, format, type_) {
            return false;
        }
        if level < 0 {
            return self.fail(caller, INVALID_VALUE, "level < 0");
        }
        if width < 0 || height < 0 {
            return self.fail(caller, INVALID_VALUE, "width or height < 0");
        }
        if border != 0 {
            return self.fail(caller, INVALID_VALUE, "border != 0");
        }
        if internal_format != format {
            return self.fail(caller, INVALID_OPERATION, "internalformat != format");
        }
        self.check(
            !is_cube_map_face(target) || width == height,
            caller,
            INVALID_VALUE,
            "cube map face not square",
        )
    }

    pub fn framebuffer_func_parameters(&self, caller: &str, target: u32, attachment: u32) -> bool {
        if target != FRAMEBUFFER {
            return self.fail(caller, INVALID_ENUM, "invalid framebuffer target");
        }
        self.check(
            matches!(
                attachment,
                COLOR_ATTACHMENT0 | DEPTH_ATTACHMENT | STENCIL_ATTACHMENT | DEPTH_STENCIL_ATTACHMENT
            ),
            caller,
            INVALID_ENUM,
            "invalid attachment",
        )
    }

    pub fn buffer_target(&self, caller: &str, target: u32) -> bool {
        self.check(
            matches!(target, ARRAY_BUFFER | ELEMENT_ARRAY_BUFFER),
            caller,
            INVALID_ENUM,
            "invalid buffer target",
        )
    }

    pub fn buffer_data_parameters(&self, caller: &str, target: u32, usage: u32) -> bool {
        self.buffer_target(caller, target)
            && self.check(
                matches!(usage, STATIC_DRAW | DYNAMIC_DRAW | STREAM_DRAW),
                caller,
                INVALID_ENUM,
                "invalid buffer usage",
            )
    }

    /// The location was queried from `program`.
    pub fn location_program(&self, caller: &str, location: &WebGLObject, program: u32) -> bool {
        let owner = location.uniform_location_parts().map(|(owner, _)| owner);
        self.check(
            owner == Some(program),
            caller,
            INVALID_OPERATION,
            "location does not belong to program",
        )
    }

    pub fn require_object(&self, caller: &str, object: Option<&Rc<WebGLObject>>) -> bool {
        self.check(object.is_some(), caller, INVALID_VALUE, "object is null")
    }

    /// `null`, or a live wrapper created by this context.
    pub fn validate_object(&self, caller: &str, object: Option<&Rc<WebGLObject>>) -> bool {
        match object {
            None => true,
            Some(object) if object.context() != self.context => {
                self.fail(caller, INVALID_OPERATION, "object from another context")
            }
            Some(object) if object.is_deleted() => {
                self.fail(caller, INVALID_OPERATION, "object is deleted")
            }
            Some(_) => true,
        }
    }

    /// [`require_object`](Self::require_object) then
    /// [`validate_object`](Self::validate_object).
    pub fn require_valid_object(&self, caller: &str, object: Option<&Rc<WebGLObject>>) -> bool {
        self.require_object(caller, object) && self.validate_object(caller, object)
    }
}

pub fn is_cube_map_face(target: u32) -> bool {
    (TEXTURE_CUBE_MAP_POSITIVE_X..=TEXTURE_CUBE_MAP_NEGATIVE_Z).contains(&target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ObjectKind;

    fn check<F: FnOnce(&Validator<'_>) -> bool>(f: F) -> (bool, u32) {
        let errors = ErrorChannel::new();
        let validator = Validator::new(&errors, ContextId::new());
        let ok = f(&validator);
        (ok, errors.current())
    }

    #[test]
    fn test_blend_equation() {
        assert_eq!(check(|v| v.blend_equation("t", FUNC_SUBTRACT)), (true, NO_ERROR));
        assert_eq!(check(|v| v.blend_equation("t", 0x1234)), (false, INVALID_ENUM));
    }

    #[test]
    fn test_blend_factors_reject_mixed_constants() {
        assert!(check(|v| v.blend_func_factors("t", CONSTANT_COLOR, ONE_MINUS_CONSTANT_COLOR)).0);
        assert_eq!(
            check(|v| v.blend_func_factors("t", CONSTANT_ALPHA, ONE_MINUS_CONSTANT_COLOR)),
            (false, INVALID_ENUM)
        );
        assert!(check(|v| v.blend_func_factors("t", SRC_ALPHA, ONE_MINUS_SRC_ALPHA)).0);
    }

    #[test]
    fn test_blend_factor_whitelist() {
        assert!(check(|v| v.blend_factor("t", ONE_MINUS_DST_ALPHA, false)).0);
        assert!(check(|v| v.blend_factor("t", SRC_ALPHA_SATURATE, true)).0);
        assert_eq!(
            check(|v| v.blend_factor("t", SRC_ALPHA_SATURATE, false)),
            (false, INVALID_ENUM)
        );
        assert_eq!(check(|v| v.blend_factor("t", 0x1234, true)), (false, INVALID_ENUM));
    }

    #[test]
    fn test_capability_and_draw_mode() {
        assert!(check(|v| v.capability("t", DITHER)).0);
        assert_eq!(check(|v| v.capability("t", TEXTURE_2D)), (false, INVALID_ENUM));
        assert!(check(|v| v.draw_mode("t", TRIANGLE_FAN)).0);
        assert_eq!(check(|v| v.draw_mode("t", 7)), (false, INVALID_ENUM));
    }

    #[test]
    fn test_texture_binding_faces() {
        assert!(check(|v| v.texture_binding("t", TEXTURE_CUBE_MAP, false)).0);
        assert!(!check(|v| v.texture_binding("t", TEXTURE_CUBE_MAP_POSITIVE_X, false)).0);
        assert!(check(|v| v.texture_binding("t", TEXTURE_CUBE_MAP_NEGATIVE_Z, true)).0);
        assert_eq!(
            check(|v| v.texture_binding("t", TEXTURE_CUBE_MAP, true)),
            (false, INVALID_ENUM)
        );
    }

    #[test]
    fn test_tex_parameter() {
        assert!(check(|v| v.tex_parameter("t", TEXTURE_MAG_FILTER, LINEAR as i32)).0);
        assert_eq!(
            check(|v| v.tex_parameter("t", TEXTURE_MAG_FILTER, LINEAR_MIPMAP_LINEAR as i32)),
            (false, INVALID_ENUM)
        );
        assert_eq!(check(|v| v.tex_parameter("t", 0x1234, 0)), (false, INVALID_ENUM));
    }

    #[test]
    fn test_tex_func_parameters() {
        let ok = |level, iformat, w, h, border, format, type_| {
            check(|v| {
                v.tex_func_parameters("t", TEXTURE_2D, level, iformat, w, h, border, format, type_)
            })
        };
        assert_eq!(ok(0, RGBA, 4, 4, 0, RGBA, UNSIGNED_BYTE), (true, NO_ERROR));
        assert_eq!(ok(-1, RGBA, 4, 4, 0, RGBA, UNSIGNED_BYTE), (false, INVALID_VALUE));
        assert_eq!(ok(0, RGBA, 4, 4, 1, RGBA, UNSIGNED_BYTE), (false, INVALID_VALUE));
        assert_eq!(ok(0, RGB, 4, 4, 0, RGBA, UNSIGNED_BYTE), (false, INVALID_OPERATION));
        assert_eq!(ok(0, RGBA, 4, 4, 0, RGBA, FLOAT), (false, INVALID_ENUM));
        assert_eq!(
            ok(0, RGBA, 4, 4, 0, RGBA, UNSIGNED_SHORT_5_6_5),
            (false, INVALID_OPERATION)
        );

        let face = check(|v| {
            v.tex_func_parameters(
                "t",
                TEXTURE_CUBE_MAP_POSITIVE_Y,
                0,
                RGB,
                4,
                8,
                0,
                RGB,
                UNSIGNED_BYTE,
            )
        });
        assert_eq!(face, (false, INVALID_VALUE));
    }

    #[test]
    fn test_framebuffer_and_buffer_parameters() {
        assert!(check(|v| v.framebuffer_func_parameters("t", FRAMEBUFFER, DEPTH_ATTACHMENT)).0);
        assert_eq!(
            check(|v| v.framebuffer_func_parameters("t", RENDERBUFFER, DEPTH_ATTACHMENT)),
            (false, INVALID_ENUM)
        );
        assert!(check(|v| v.buffer_data_parameters("t", ELEMENT_ARRAY_BUFFER, STREAM_DRAW)).0);
        assert_eq!(
            check(|v| v.buffer_data_parameters("t", ARRAY_BUFFER, 0x1234)),
            (false, INVALID_ENUM)
        );
    }

    #[test]
    fn test_object_checks() {
        let errors = ErrorChannel::new();
        let context = ContextId::new();
        let validator = Validator::new(&errors, context);

        assert!(!validator.require_object("t", None));
        assert_eq!(errors.current(), INVALID_VALUE);

        let errors = ErrorChannel::new();
        let validator = Validator::new(&errors, context);
        let foreign = Rc::new(WebGLObject::named(ObjectKind::Buffer, 1, ContextId::new()));
        assert!(validator.validate_object("t", None));
        assert!(!validator.validate_object("t", Some(&foreign)));
        assert_eq!(errors.current(), INVALID_OPERATION);

        let errors = ErrorChannel::new();
        let validator = Validator::new(&errors, context);
        let own = Rc::new(WebGLObject::named(ObjectKind::Buffer, 2, context));
        assert!(validator.require_valid_object("t", Some(&own)));
        own.mark_deleted();
        assert!(!validator.validate_object("t", Some(&own)));
        assert_eq!(errors.current(), INVALID_OPERATION);
    }

    #[test]
    fn test_location_program() {
        let context = ContextId::new();
        let location = WebGLObject::uniform_location(5, 0, context);
        assert!(check(|v| v.location_program("t", &location, 5)).0);
        assert_eq!(
            check(|v| v.location_program("t", &location, 6)),
            (false, INVALID_OPERATION)
        );
    }
}
