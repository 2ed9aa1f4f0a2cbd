//! Graphics driver seam.
//!
//! [`GlDriver`] mirrors the OpenGL ES 2.0 entry points the bindings use,
//! with Rust types in place of pointers: slices for arrays, `Option` for
//! nullable data, `String` for returned text. Object names are plain `u32`
//! and 0 means "none". Every method takes `&self`; drivers that keep state
//! use interior mutability.

use crate::objects::ActiveInfo;

pub trait GlDriver {
    /// Make the drawing surface current on this thread. Called before
    /// every dispatched method.
    fn make_current(&self) {}

    fn get_error(&self) -> u32;

    // ==================== Objects ====================

    fn gen_buffer(&self) -> u32;
    fn gen_framebuffer(&self) -> u32;
    fn gen_renderbuffer(&self) -> u32;
    fn gen_texture(&self) -> u32;
    fn create_program(&self) -> u32;
    fn create_shader(&self, shader_type: u32) -> u32;

    fn delete_buffer(&self, buffer: u32);
    fn delete_framebuffer(&self, framebuffer: u32);
    fn delete_renderbuffer(&self, renderbuffer: u32);
    fn delete_texture(&self, texture: u32);
    fn delete_program(&self, program: u32);
    fn delete_shader(&self, shader: u32);

    fn is_buffer(&self, buffer: u32) -> bool;
    fn is_framebuffer(&self, framebuffer: u32) -> bool;
    fn is_renderbuffer(&self, renderbuffer: u32) -> bool;
    fn is_texture(&self, texture: u32) -> bool;
    fn is_program(&self, program: u32) -> bool;
    fn is_shader(&self, shader: u32) -> bool;

    // ==================== Bindings ====================

    fn active_texture(&self, texture: u32);
    fn bind_buffer(&self, target: u32, buffer: u32);
    fn bind_framebuffer(&self, target: u32, framebuffer: u32);
    fn bind_renderbuffer(&self, target: u32, renderbuffer: u32);
    fn bind_texture(&self, target: u32, texture: u32);

    // ==================== Fixed-function state ====================

    fn blend_color(&self, red: f32, green: f32, blue: f32, alpha: f32);
    fn blend_equation(&self, mode: u32);
    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32);
    fn blend_func(&self, sfactor: u32, dfactor: u32);
    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);
    fn clear(&self, mask: u32);
    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32);
    fn clear_depth(&self, depth: f32);
    fn clear_stencil(&self, s: i32);
    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool);
    fn cull_face(&self, mode: u32);
    fn depth_func(&self, func: u32);
    fn depth_mask(&self, flag: bool);
    fn depth_range(&self, near: f32, far: f32);
    fn disable(&self, cap: u32);
    fn enable(&self, cap: u32);
    fn is_enabled(&self, cap: u32) -> bool;
    fn front_face(&self, mode: u32);
    fn hint(&self, target: u32, mode: u32);
    fn line_width(&self, width: f32);
    fn pixel_store_i(&self, pname: u32, param: i32);
    fn polygon_offset(&self, factor: f32, units: f32);
    fn sample_coverage(&self, value: f32, invert: bool);
    fn scissor(&self, x: i32, y: i32, width: i32, height: i32);
    fn stencil_func(&self, func: u32, reference: i32, mask: u32);
    fn stencil_func_separate(&self, face: u32, func: u32, reference: i32, mask: u32);
    fn stencil_mask(&self, mask: u32);
    fn stencil_mask_separate(&self, face: u32, mask: u32);
    fn stencil_op(&self, fail: u32, zfail: u32, zpass: u32);
    fn stencil_op_separate(&self, face: u32, fail: u32, zfail: u32, zpass: u32);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);

    // ==================== Buffers ====================

    /// `data` is `None` to allocate `size` bytes with undefined contents.
    fn buffer_data(&self, target: u32, size: isize, data: Option<&[u8]>, usage: u32);
    fn buffer_sub_data(&self, target: u32, offset: isize, data: &[u8]);
    fn get_buffer_parameter_iv(&self, target: u32, pname: u32) -> i32;

    // ==================== Framebuffers and renderbuffers ====================

    fn check_framebuffer_status(&self, target: u32) -> u32;
    fn framebuffer_renderbuffer(
        &self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: u32,
    );
    fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: u32,
        level: i32,
    );
    fn get_framebuffer_attachment_parameter_iv(
        &self,
        target: u32,
        attachment: u32,
        pname: u32,
    ) -> i32;
    fn renderbuffer_storage(&self, target: u32, internal_format: u32, width: i32, height: i32);
    fn get_renderbuffer_parameter_iv(&self, target: u32, pname: u32) -> i32;

    // ==================== Textures ====================

    #[allow(clippy::too_many_arguments)]
    fn copy_tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: u32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        border: i32,
    );
    #[allow(clippy::too_many_arguments)]
    fn copy_tex_sub_image_2d(
        &self,
        target: u32,
        level: i32,
        xoffset: i32,
        yoffset: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    );
    fn generate_mipmap(&self, target: u32);
    fn get_tex_parameter_iv(&self, target: u32, pname: u32) -> i32;
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        border: i32,
        format: u32,
        type_: u32,
        pixels: Option<&[u8]>,
    );
    #[allow(clippy::too_many_arguments)]
    fn tex_sub_image_2d(
        &self,
        target: u32,
        level: i32,
        xoffset: i32,
        yoffset: i32,
        width: i32,
        height: i32,
        format: u32,
        type_: u32,
        pixels: &[u8],
    );
    fn tex_parameter_f(&self, target: u32, pname: u32, param: f32);
    fn tex_parameter_i(&self, target: u32, pname: u32, param: i32);

    // ==================== Programs and shaders ====================

    fn attach_shader(&self, program: u32, shader: u32);
    fn bind_attrib_location(&self, program: u32, index: u32, name: &str);
    fn compile_shader(&self, shader: u32);
    fn detach_shader(&self, program: u32, shader: u32);
    fn get_active_attrib(&self, program: u32, index: u32) -> Option<ActiveInfo>;
    fn get_active_uniform(&self, program: u32, index: u32) -> Option<ActiveInfo>;
    fn get_attached_shaders(&self, program: u32) -> Vec<u32>;
    fn get_attrib_location(&self, program: u32, name: &str) -> i32;
    fn get_program_iv(&self, program: u32, pname: u32) -> i32;
    fn get_program_info_log(&self, program: u32) -> String;
    fn get_shader_iv(&self, shader: u32, pname: u32) -> i32;
    fn get_shader_info_log(&self, shader: u32) -> String;
    fn get_uniform_location(&self, program: u32, name: &str) -> i32;
    fn get_uniform_fv(&self, program: u32, location: i32, values: &mut [f32]);
    fn get_uniform_iv(&self, program: u32, location: i32, values: &mut [i32]);
    fn link_program(&self, program: u32);
    fn shader_source(&self, shader: u32, source: &str);
    fn use_program(&self, program: u32);
    fn validate_program(&self, program: u32);

    // ==================== Uniforms ====================

    fn uniform_1f(&self, location: i32, x: f32);
    fn uniform_2f(&self, location: i32, x: f32, y: f32);
    fn uniform_3f(&self, location: i32, x: f32, y: f32, z: f32);
    fn uniform_4f(&self, location: i32, x: f32, y: f32, z: f32, w: f32);
    fn uniform_1i(&self, location: i32, x: i32);
    fn uniform_2i(&self, location: i32, x: i32, y: i32);
    fn uniform_3i(&self, location: i32, x: i32, y: i32, z: i32);
    fn uniform_4i(&self, location: i32, x: i32, y: i32, z: i32, w: i32);
    fn uniform_1fv(&self, location: i32, count: i32, values: &[f32]);
    fn uniform_2fv(&self, location: i32, count: i32, values: &[f32]);
    fn uniform_3fv(&self, location: i32, count: i32, values: &[f32]);
    fn uniform_4fv(&self, location: i32, count: i32, values: &[f32]);
    fn uniform_1iv(&self, location: i32, count: i32, values: &[i32]);
    fn uniform_2iv(&self, location: i32, count: i32, values: &[i32]);
    fn uniform_3iv(&self, location: i32, count: i32, values: &[i32]);
    fn uniform_4iv(&self, location: i32, count: i32, values: &[i32]);
    fn uniform_matrix_2fv(&self, location: i32, count: i32, transpose: bool, values: &[f32]);
    fn uniform_matrix_3fv(&self, location: i32, count: i32, transpose: bool, values: &[f32]);
    fn uniform_matrix_4fv(&self, location: i32, count: i32, transpose: bool, values: &[f32]);

    // ==================== Vertex attributes ====================

    fn disable_vertex_attrib_array(&self, index: u32);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn get_vertex_attrib_fv(&self, index: u32, pname: u32, values: &mut [f32]);
    fn get_vertex_attrib_iv(&self, index: u32, pname: u32) -> i32;
    fn get_vertex_attrib_offset(&self, index: u32, pname: u32) -> usize;
    fn vertex_attrib_1f(&self, index: u32, x: f32);
    fn vertex_attrib_2f(&self, index: u32, x: f32, y: f32);
    fn vertex_attrib_3f(&self, index: u32, x: f32, y: f32, z: f32);
    fn vertex_attrib_4f(&self, index: u32, x: f32, y: f32, z: f32, w: f32);
    fn vertex_attrib_1fv(&self, index: u32, values: &[f32]);
    fn vertex_attrib_2fv(&self, index: u32, values: &[f32]);
    fn vertex_attrib_3fv(&self, index: u32, values: &[f32]);
    fn vertex_attrib_4fv(&self, index: u32, values: &[f32]);
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        type_: u32,
        normalized: bool,
        stride: i32,
        offset: isize,
    );

    // ==================== Drawing ====================

    fn draw_arrays(&self, mode: u32, first: i32, count: i32);
    fn draw_elements(&self, mode: u32, count: i32, type_: u32, offset: isize);
    fn finish(&self);
    fn flush(&self);
    #[allow(clippy::too_many_arguments)]
    fn read_pixels(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        type_: u32,
        pixels: &mut [u8],
    );

    // ==================== Queries ====================

    fn get_boolean_v(&self, pname: u32, values: &mut [bool]);
    fn get_float_v(&self, pname: u32, values: &mut [f32]);
    fn get_integer_v(&self, pname: u32, values: &mut [i32]);
    fn get_string(&self, pname: u32) -> String;
}
