//! Method-name table for [`RenderingContext::call`].

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::api::{buffers, framebuffers, programs, state, textures, uniforms, vertex};
use crate::context::RenderingContext;
use crate::marshal::Arguments;
use crate::parameters;
use crate::{JsValue, TypeError};

pub(crate) type Handler = fn(&mut RenderingContext, &Arguments<'_>) -> Result<JsValue, TypeError>;

macro_rules! methods {
    ($($name:literal => $handler:path,)*) => {
        &[$(($name, $handler as Handler),)*]
    };
}

static METHODS: &[(&str, Handler)] = methods! {
    // Context
    "getContextAttributes" => state::get_context_attributes,
    "isContextLost" => state::is_context_lost,
    "getSupportedExtensions" => state::get_supported_extensions,
    "getExtension" => state::get_extension,
    "getError" => state::get_error,
    "getParameter" => parameters::get_parameter,
    "finish" => state::finish,
    "flush" => state::flush,

    // Fixed-function state
    "blendColor" => state::blend_color,
    "blendEquation" => state::blend_equation,
    "blendEquationSeparate" => state::blend_equation_separate,
    "blendFunc" => state::blend_func,
    "blendFuncSeparate" => state::blend_func_separate,
    "clear" => state::clear,
    "clearColor" => state::clear_color,
    "clearDepth" => state::clear_depth,
    "clearStencil" => state::clear_stencil,
    "colorMask" => state::color_mask,
    "cullFace" => state::cull_face,
    "depthFunc" => state::depth_func,
    "depthMask" => state::depth_mask,
    "depthRange" => state::depth_range,
    "disable" => state::disable,
    "enable" => state::enable,
    "isEnabled" => state::is_enabled,
    "frontFace" => state::front_face,
    "hint" => state::hint,
    "lineWidth" => state::line_width,
    "pixelStorei" => state::pixel_storei,
    "polygonOffset" => state::polygon_offset,
    "sampleCoverage" => state::sample_coverage,
    "scissor" => state::scissor,
    "stencilFunc" => state::stencil_func,
    "stencilFuncSeparate" => state::stencil_func_separate,
    "stencilMask" => state::stencil_mask,
    "stencilMaskSeparate" => state::stencil_mask_separate,
    "stencilOp" => state::stencil_op,
    "stencilOpSeparate" => state::stencil_op_separate,
    "viewport" => state::viewport,

    // Buffers
    "createBuffer" => buffers::create_buffer,
    "deleteBuffer" => buffers::delete_buffer,
    "isBuffer" => buffers::is_buffer,
    "bindBuffer" => buffers::bind_buffer,
    "bufferData" => buffers::buffer_data,
    "bufferSubData" => buffers::buffer_sub_data,
    "getBufferParameter" => buffers::get_buffer_parameter,

    // Framebuffers and renderbuffers
    "createFramebuffer" => framebuffers::create_framebuffer,
    "deleteFramebuffer" => framebuffers::delete_framebuffer,
    "isFramebuffer" => framebuffers::is_framebuffer,
    "bindFramebuffer" => framebuffers::bind_framebuffer,
    "checkFramebufferStatus" => framebuffers::check_framebuffer_status,
    "framebufferRenderbuffer" => framebuffers::framebuffer_renderbuffer,
    "framebufferTexture2D" => framebuffers::framebuffer_texture_2d,
    "getFramebufferAttachmentParameter" => framebuffers::get_framebuffer_attachment_parameter,
    "createRenderbuffer" => framebuffers::create_renderbuffer,
    "deleteRenderbuffer" => framebuffers::delete_renderbuffer,
    "isRenderbuffer" => framebuffers::is_renderbuffer,
    "bindRenderbuffer" => framebuffers::bind_renderbuffer,
    "renderbufferStorage" => framebuffers::renderbuffer_storage,
    "getRenderbufferParameter" => framebuffers::get_renderbuffer_parameter,
    "readPixels" => framebuffers::read_pixels,

    // Textures
    "activeTexture" => textures::active_texture,
    "createTexture" => textures::create_texture,
    "deleteTexture" => textures::delete_texture,
    "isTexture" => textures::is_texture,
    "bindTexture" => textures::bind_texture,
    "copyTexImage2D" => textures::copy_tex_image_2d,
    "copyTexSubImage2D" => textures::copy_tex_sub_image_2d,
    "generateMipmap" => textures::generate_mipmap,
    "getTexParameter" => textures::get_tex_parameter,
    "texImage2D" => textures::tex_image_2d,
    "texSubImage2D" => textures::tex_sub_image_2d,
    "texParameterf" => textures::tex_parameterf,
    "texParameteri" => textures::tex_parameteri,

    // Programs
    "createProgram" => programs::create_program,
    "deleteProgram" => programs::delete_program,
    "isProgram" => programs::is_program,
    "attachShader" => programs::attach_shader,
    "detachShader" => programs::detach_shader,
    "bindAttribLocation" => programs::bind_attrib_location,
    "linkProgram" => programs::link_program,
    "useProgram" => programs::use_program,
    "validateProgram" => programs::validate_program,
    "getProgramParameter" => programs::get_program_parameter,
    "getProgramInfoLog" => programs::get_program_info_log,
    "getAttachedShaders" => programs::get_attached_shaders,
    "getActiveAttrib" => programs::get_active_attrib,
    "getActiveUniform" => programs::get_active_uniform,
    "getAttribLocation" => programs::get_attrib_location,
    "getUniformLocation" => programs::get_uniform_location,
    "getUniform" => programs::get_uniform,

    // Shaders
    "createShader" => programs::create_shader,
    "deleteShader" => programs::delete_shader,
    "isShader" => programs::is_shader,
    "shaderSource" => programs::shader_source,
    "compileShader" => programs::compile_shader,
    "getShaderParameter" => programs::get_shader_parameter,
    "getShaderInfoLog" => programs::get_shader_info_log,
    "getShaderSource" => programs::get_shader_source,

    // Uniforms
    "uniform1f" => uniforms::uniform_1f,
    "uniform2f" => uniforms::uniform_2f,
    "uniform3f" => uniforms::uniform_3f,
    "uniform4f" => uniforms::uniform_4f,
    "uniform1i" => uniforms::uniform_1i,
    "uniform2i" => uniforms::uniform_2i,
    "uniform3i" => uniforms::uniform_3i,
    "uniform4i" => uniforms::uniform_4i,
    "uniform1fv" => uniforms::uniform_1fv,
    "uniform2fv" => uniforms::uniform_2fv,
    "uniform3fv" => uniforms::uniform_3fv,
    "uniform4fv" => uniforms::uniform_4fv,
    "uniform1iv" => uniforms::uniform_1iv,
    "uniform2iv" => uniforms::uniform_2iv,
    "uniform3iv" => uniforms::uniform_3iv,
    "uniform4iv" => uniforms::uniform_4iv,
    "uniformMatrix2fv" => uniforms::uniform_matrix_2fv,
    "uniformMatrix3fv" => uniforms::uniform_matrix_3fv,
    "uniformMatrix4fv" => uniforms::uniform_matrix_4fv,

    // Vertex attributes and drawing
    "enableVertexAttribArray" => vertex::enable_vertex_attrib_array,
    "disableVertexAttribArray" => vertex::disable_vertex_attrib_array,
    "vertexAttrib1f" => vertex::vertex_attrib_1f,
    "vertexAttrib2f" => vertex::vertex_attrib_2f,
    "vertexAttrib3f" => vertex::vertex_attrib_3f,
    "vertexAttrib4f" => vertex::vertex_attrib_4f,
    "vertexAttrib1fv" => vertex::vertex_attrib_1fv,
    "vertexAttrib2fv" => vertex::vertex_attrib_2fv,
    "vertexAttrib3fv" => vertex::vertex_attrib_3fv,
    "vertexAttrib4fv" => vertex::vertex_attrib_4fv,
    "vertexAttribPointer" => vertex::vertex_attrib_pointer,
    "getVertexAttrib" => vertex::get_vertex_attrib,
    "getVertexAttribOffset" => vertex::get_vertex_attrib_offset,
    "drawArrays" => vertex::draw_arrays,
    "drawElements" => vertex::draw_elements,
};

fn table() -> &'static HashMap<&'static str, Handler> {
    static TABLE: OnceLock<HashMap<&'static str, Handler>> = OnceLock::new();
    TABLE.get_or_init(|| METHODS.iter().copied().collect())
}

/// The method's canonical name and handler.
pub(crate) fn lookup(method: &str) -> Option<(&'static str, Handler)> {
    table()
        .get_key_value(method)
        .map(|(name, handler)| (*name, *handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_method_names_are_unique() {
        let names: HashSet<_> = METHODS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), METHODS.len());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("drawArrays").map(|(name, _)| name), Some("drawArrays"));
        assert!(lookup("drawarrays").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_full_method_set() {
        // WebGL 1.0 methods, extensions excluded.
        assert_eq!(METHODS.len(), 133);
    }
}
