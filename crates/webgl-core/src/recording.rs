//! Headless driver that records every call.
//!
//! [`RecordingDriver`] keeps just enough GL state to answer the queries the
//! bindings make: object names, bindings, capabilities, pixel-store
//! alignment, program uniforms and attributes, and a native error queue.
//! Clones share state, so a host or test can keep one clone for inspection
//! and hand the other to a [`RenderingContext`](crate::RenderingContext).

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use crate::constants::*;
use crate::driver::GlDriver;
use crate::objects::{ActiveInfo, ObjectKind};

// ==================== Recorded calls ====================

/// One recorded argument.
#[derive(Debug, Clone, PartialEq)]
pub enum CallArg {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// Byte payload; `None` for a null data pointer.
    Bytes(Option<Vec<u8>>),
    Floats(Vec<f32>),
    Ints(Vec<i32>),
}

impl From<u32> for CallArg {
    fn from(value: u32) -> Self {
        CallArg::Int(value as i64)
    }
}

impl From<i32> for CallArg {
    fn from(value: i32) -> Self {
        CallArg::Int(value as i64)
    }
}

impl From<isize> for CallArg {
    fn from(value: isize) -> Self {
        CallArg::Int(value as i64)
    }
}

impl From<f32> for CallArg {
    fn from(value: f32) -> Self {
        CallArg::Float(value as f64)
    }
}

impl From<bool> for CallArg {
    fn from(value: bool) -> Self {
        CallArg::Bool(value)
    }
}

impl From<&str> for CallArg {
    fn from(value: &str) -> Self {
        CallArg::Str(value.to_string())
    }
}

impl From<&[u8]> for CallArg {
    fn from(value: &[u8]) -> Self {
        CallArg::Bytes(Some(value.to_vec()))
    }
}

impl From<Option<&[u8]>> for CallArg {
    fn from(value: Option<&[u8]>) -> Self {
        CallArg::Bytes(value.map(<[u8]>::to_vec))
    }
}

impl From<&[f32]> for CallArg {
    fn from(value: &[f32]) -> Self {
        CallArg::Floats(value.to_vec())
    }
}

impl From<&[i32]> for CallArg {
    fn from(value: &[i32]) -> Self {
        CallArg::Ints(value.to_vec())
    }
}

/// A recorded native call, named after the GL entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct GlCall {
    pub name: &'static str,
    pub args: Vec<CallArg>,
}

impl GlCall {
    pub fn arg(&self, index: usize) -> Option<&CallArg> {
        self.args.get(index)
    }
}

// ==================== Simulated state ====================

#[derive(Debug, Clone)]
struct UniformRecord {
    info: ActiveInfo,
    location: i32,
}

#[derive(Debug, Clone, Default)]
struct ProgramRecord {
    shaders: Vec<u32>,
    uniforms: Vec<UniformRecord>,
    attribs: Vec<ActiveInfo>,
    values: HashMap<i32, Vec<f32>>,
    linked: bool,
    validated: bool,
}

#[derive(Debug, Clone)]
struct ShaderRecord {
    shader_type: u32,
    source: String,
    compiled: bool,
    info_log: String,
}

#[derive(Debug, Clone)]
struct VertexAttrib {
    enabled: bool,
    size: i32,
    type_: u32,
    normalized: bool,
    stride: i32,
    offset: isize,
    buffer: u32,
    current: [f32; 4],
}

impl Default for VertexAttrib {
    fn default() -> Self {
        Self {
            enabled: false,
            size: 4,
            type_: FLOAT,
            normalized: false,
            stride: 0,
            offset: 0,
            buffer: 0,
            current: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug)]
struct RecordingState {
    calls: Vec<GlCall>,
    make_current_count: usize,
    next_name: u32,
    next_location: i32,
    live: HashMap<ObjectKind, HashSet<u32>>,
    capabilities: HashSet<u32>,
    errors: VecDeque<u32>,
    integers: HashMap<u32, Vec<i32>>,
    floats: HashMap<u32, Vec<f32>>,
    booleans: HashMap<u32, Vec<bool>>,
    strings: HashMap<u32, String>,
    programs: HashMap<u32, ProgramRecord>,
    shaders: HashMap<u32, ShaderRecord>,
    buffers: HashMap<u32, (i32, u32)>,
    renderbuffers: HashMap<u32, (u32, i32, i32)>,
    tex_params: HashMap<(u32, u32), i32>,
    attachments: HashMap<u32, (u32, u32)>,
    vertex_attribs: HashMap<u32, VertexAttrib>,
}

impl Default for RecordingState {
    fn default() -> Self {
        let integers = [
            (ACTIVE_TEXTURE, vec![TEXTURE0 as i32]),
            (PACK_ALIGNMENT, vec![4]),
            (UNPACK_ALIGNMENT, vec![4]),
            (VIEWPORT, vec![0, 0, 300, 150]),
            (SCISSOR_BOX, vec![0, 0, 300, 150]),
            (MAX_VIEWPORT_DIMS, vec![4096, 4096]),
            (MAX_TEXTURE_SIZE, vec![4096]),
            (MAX_CUBE_MAP_TEXTURE_SIZE, vec![4096]),
            (MAX_RENDERBUFFER_SIZE, vec![4096]),
            (MAX_VERTEX_ATTRIBS, vec![16]),
            (MAX_TEXTURE_IMAGE_UNITS, vec![16]),
            (MAX_COMBINED_TEXTURE_IMAGE_UNITS, vec![32]),
            (MAX_VERTEX_TEXTURE_IMAGE_UNITS, vec![16]),
            (MAX_VERTEX_UNIFORM_VECTORS, vec![256]),
            (MAX_FRAGMENT_UNIFORM_VECTORS, vec![256]),
            (MAX_VARYING_VECTORS, vec![15]),
            (RED_BITS, vec![8]),
            (GREEN_BITS, vec![8]),
            (BLUE_BITS, vec![8]),
            (ALPHA_BITS, vec![8]),
            (DEPTH_BITS, vec![24]),
            (STENCIL_BITS, vec![8]),
            (SUBPIXEL_BITS, vec![4]),
            (STENCIL_VALUE_MASK, vec![-1]),
            (STENCIL_WRITEMASK, vec![-1]),
            (STENCIL_BACK_VALUE_MASK, vec![-1]),
            (STENCIL_BACK_WRITEMASK, vec![-1]),
            (STENCIL_FUNC, vec![ALWAYS as i32]),
            (STENCIL_BACK_FUNC, vec![ALWAYS as i32]),
            (DEPTH_FUNC, vec![LESS as i32]),
            (CULL_FACE_MODE, vec![BACK as i32]),
            (FRONT_FACE, vec![CCW as i32]),
            (BLEND_SRC_RGB, vec![ONE as i32]),
            (BLEND_SRC_ALPHA, vec![ONE as i32]),
            (BLEND_DST_RGB, vec![ZERO as i32]),
            (BLEND_DST_ALPHA, vec![ZERO as i32]),
            (BLEND_EQUATION_RGB, vec![FUNC_ADD as i32]),
            (BLEND_EQUATION_ALPHA, vec![FUNC_ADD as i32]),
            (GENERATE_MIPMAP_HINT, vec![DONT_CARE as i32]),
        ]
        .into_iter()
        .collect();

        let floats = [
            (COLOR_CLEAR_VALUE, vec![0.0; 4]),
            (BLEND_COLOR, vec![0.0; 4]),
            (DEPTH_RANGE, vec![0.0, 1.0]),
            (DEPTH_CLEAR_VALUE, vec![1.0]),
            (LINE_WIDTH, vec![1.0]),
            (ALIASED_LINE_WIDTH_RANGE, vec![1.0, 1.0]),
            (ALIASED_POINT_SIZE_RANGE, vec![1.0, 64.0]),
            (SAMPLE_COVERAGE_VALUE, vec![1.0]),
        ]
        .into_iter()
        .collect();

        let booleans = [
            (COLOR_WRITEMASK, vec![true; 4]),
            (DEPTH_WRITEMASK, vec![true]),
            (SAMPLE_COVERAGE_INVERT, vec![false]),
        ]
        .into_iter()
        .collect();

        let strings = [
            (VENDOR, "recording".to_string()),
            (RENDERER, "recording".to_string()),
            (VERSION, "OpenGL ES 2.0 recording".to_string()),
            (SHADING_LANGUAGE_VERSION, "OpenGL ES GLSL ES 1.00 recording".to_string()),
        ]
        .into_iter()
        .collect();

        Self {
            calls: Vec::new(),
            make_current_count: 0,
            next_name: 1,
            next_location: 0,
            live: HashMap::new(),
            capabilities: [DITHER].into_iter().collect(),
            errors: VecDeque::new(),
            integers,
            floats,
            booleans,
            strings,
            programs: HashMap::new(),
            shaders: HashMap::new(),
            buffers: HashMap::new(),
            renderbuffers: HashMap::new(),
            tex_params: HashMap::new(),
            attachments: HashMap::new(),
            vertex_attribs: HashMap::new(),
        }
    }
}

impl RecordingState {
    fn gen(&mut self, kind: ObjectKind) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        self.live.entry(kind).or_default().insert(name);
        name
    }

    fn free(&mut self, kind: ObjectKind, name: u32, bindings: &[u32]) {
        if name == 0 {
            return;
        }
        if let Some(live) = self.live.get_mut(&kind) {
            live.remove(&name);
        }
        for pname in bindings {
            if self.binding(*pname) == name {
                self.integers.insert(*pname, vec![0]);
            }
        }
    }

    fn is_live(&self, kind: ObjectKind, name: u32) -> bool {
        self.live.get(&kind).is_some_and(|live| live.contains(&name))
    }

    fn binding(&self, pname: u32) -> u32 {
        self.integers
            .get(&pname)
            .and_then(|values| values.first())
            .map_or(0, |v| *v as u32)
    }

    fn set_integers(&mut self, pname: u32, values: &[i32]) {
        self.integers.insert(pname, values.to_vec());
    }

    fn attrib(&mut self, index: u32) -> &mut VertexAttrib {
        self.vertex_attribs.entry(index).or_default()
    }

    fn store_uniform(&mut self, location: i32, count: usize, values: &[f32]) {
        let program = self.binding(CURRENT_PROGRAM);
        let Some(record) = self.programs.get_mut(&program) else {
            return;
        };
        let count = count.max(1);
        let width = values.len() / count;
        if width == 0 {
            return;
        }
        for (i, chunk) in values.chunks_exact(width).take(count).enumerate() {
            record.values.insert(location + i as i32, chunk.to_vec());
        }
    }

    fn load_uniform(&self, program: u32, location: i32) -> Vec<f32> {
        self.programs
            .get(&program)
            .and_then(|record| record.values.get(&location))
            .cloned()
            .unwrap_or_default()
    }

    fn bound_buffer(&self, target: u32) -> u32 {
        match target {
            ARRAY_BUFFER => self.binding(ARRAY_BUFFER_BINDING),
            ELEMENT_ARRAY_BUFFER => self.binding(ELEMENT_ARRAY_BUFFER_BINDING),
            _ => 0,
        }
    }

    fn bound_texture(&self, target: u32) -> u32 {
        match target {
            TEXTURE_CUBE_MAP => self.binding(TEXTURE_BINDING_CUBE_MAP),
            _ => self.binding(TEXTURE_BINDING_2D),
        }
    }
}

// ==================== Driver ====================

/// A driver with no GPU behind it.
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    state: Rc<RefCell<RecordingState>>,
}

macro_rules! record {
    ($self:ident, $name:literal $(, $arg:expr)* $(,)?) => {
        $self.record($name, vec![$(CallArg::from($arg)),*])
    };
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, name: &'static str, args: Vec<CallArg>) {
        self.state.borrow_mut().calls.push(GlCall { name, args });
    }

    // ---- inspection ----

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn take_calls(&self) -> Vec<GlCall> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Recorded calls to one entry point, e.g. `"glBufferData"`.
    pub fn calls_named(&self, name: &str) -> Vec<GlCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.name == name)
            .cloned()
            .collect()
    }

    pub fn was_called(&self, name: &str) -> bool {
        self.state.borrow().calls.iter().any(|call| call.name == name)
    }

    pub fn last_call(&self) -> Option<GlCall> {
        self.state.borrow().calls.last().cloned()
    }

    pub fn make_current_count(&self) -> usize {
        self.state.borrow().make_current_count
    }

    /// Current contents of a uniform, as floats.
    pub fn uniform_value(&self, program: u32, location: i32) -> Vec<f32> {
        self.state.borrow().load_uniform(program, location)
    }

    // ---- configuration ----

    /// Queue a native error for `get_error`.
    pub fn push_error(&self, code: u32) {
        self.state.borrow_mut().errors.push_back(code);
    }

    pub fn set_string(&self, pname: u32, value: impl Into<String>) {
        self.state.borrow_mut().strings.insert(pname, value.into());
    }

    pub fn set_integer(&self, pname: u32, values: &[i32]) {
        self.state.borrow_mut().set_integers(pname, values);
    }

    /// Declare an active uniform on a program. Array uniforms get
    /// consecutive locations; the first is returned.
    pub fn add_uniform(&self, program: u32, name: &str, type_: u32, size: i32) -> i32 {
        let mut state = self.state.borrow_mut();
        let location = state.next_location;
        state.next_location += size.max(1);
        state
            .programs
            .entry(program)
            .or_default()
            .uniforms
            .push(UniformRecord {
                info: ActiveInfo {
                    size,
                    type_,
                    name: name.to_string(),
                },
                location,
            });
        location
    }

    /// Compiler output reported for a shader.
    pub fn set_shader_info_log(&self, shader: u32, log: &str) {
        if let Some(record) = self.state.borrow_mut().shaders.get_mut(&shader) {
            record.info_log = log.to_string();
        }
    }

    /// Declare an active attribute; its location is its index.
    pub fn add_attrib(&self, program: u32, name: &str, type_: u32, size: i32) -> i32 {
        let mut state = self.state.borrow_mut();
        let attribs = &mut state.programs.entry(program).or_default().attribs;
        attribs.push(ActiveInfo {
            size,
            type_,
            name: name.to_string(),
        });
        attribs.len() as i32 - 1
    }
}

impl GlDriver for RecordingDriver {
    fn make_current(&self) {
        self.state.borrow_mut().make_current_count += 1;
    }

    fn get_error(&self) -> u32 {
        self.state.borrow_mut().errors.pop_front().unwrap_or(NO_ERROR)
    }

    // ==================== Objects ====================

    fn gen_buffer(&self) -> u32 {
        let name = self.state.borrow_mut().gen(ObjectKind::Buffer);
        record!(self, "glGenBuffers", name);
        name
    }

    fn gen_framebuffer(&self) -> u32 {
        let name = self.state.borrow_mut().gen(ObjectKind::Framebuffer);
        record!(self, "glGenFramebuffers", name);
        name
    }

    fn gen_renderbuffer(&self) -> u32 {
        let name = self.state.borrow_mut().gen(ObjectKind::Renderbuffer);
        record!(self, "glGenRenderbuffers", name);
        name
    }

    fn gen_texture(&self) -> u32 {
        let name = self.state.borrow_mut().gen(ObjectKind::Texture);
        record!(self, "glGenTextures", name);
        name
    }

    fn create_program(&self) -> u32 {
        let name = {
            let mut state = self.state.borrow_mut();
            let name = state.gen(ObjectKind::Program);
            state.programs.entry(name).or_default();
            name
        };
        record!(self, "glCreateProgram", name);
        name
    }

    fn create_shader(&self, shader_type: u32) -> u32 {
        let name = {
            let mut state = self.state.borrow_mut();
            let name = state.gen(ObjectKind::Shader);
            state.shaders.insert(
                name,
                ShaderRecord {
                    shader_type,
                    source: String::new(),
                    compiled: false,
                    info_log: String::new(),
                },
            );
            name
        };
        record!(self, "glCreateShader", shader_type, name);
        name
    }

    fn delete_buffer(&self, buffer: u32) {
        self.state.borrow_mut().free(
            ObjectKind::Buffer,
            buffer,
            &[ARRAY_BUFFER_BINDING, ELEMENT_ARRAY_BUFFER_BINDING],
        );
        record!(self, "glDeleteBuffers", buffer);
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        self.state
            .borrow_mut()
            .free(ObjectKind::Framebuffer, framebuffer, &[FRAMEBUFFER_BINDING]);
        record!(self, "glDeleteFramebuffers", framebuffer);
    }

    fn delete_renderbuffer(&self, renderbuffer: u32) {
        self.state
            .borrow_mut()
            .free(ObjectKind::Renderbuffer, renderbuffer, &[RENDERBUFFER_BINDING]);
        record!(self, "glDeleteRenderbuffers", renderbuffer);
    }

    fn delete_texture(&self, texture: u32) {
        self.state.borrow_mut().free(
            ObjectKind::Texture,
            texture,
            &[TEXTURE_BINDING_2D, TEXTURE_BINDING_CUBE_MAP],
        );
        record!(self, "glDeleteTextures", texture);
    }

    fn delete_program(&self, program: u32) {
        self.state.borrow_mut().free(ObjectKind::Program, program, &[]);
        record!(self, "glDeleteProgram", program);
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().free(ObjectKind::Shader, shader, &[]);
        record!(self, "glDeleteShader", shader);
    }

    fn is_buffer(&self, buffer: u32) -> bool {
        record!(self, "glIsBuffer", buffer);
        self.state.borrow().is_live(ObjectKind::Buffer, buffer)
    }

    fn is_framebuffer(&self, framebuffer: u32) -> bool {
        record!(self, "glIsFramebuffer", framebuffer);
        self.state.borrow().is_live(ObjectKind::Framebuffer, framebuffer)
    }

    fn is_renderbuffer(&self, renderbuffer: u32) -> bool {
        record!(self, "glIsRenderbuffer", renderbuffer);
        self.state.borrow().is_live(ObjectKind::Renderbuffer, renderbuffer)
    }

    fn is_texture(&self, texture: u32) -> bool {
        record!(self, "glIsTexture", texture);
        self.state.borrow().is_live(ObjectKind::Texture, texture)
    }

    fn is_program(&self, program: u32) -> bool {
        record!(self, "glIsProgram", program);
        self.state.borrow().is_live(ObjectKind::Program, program)
    }

    fn is_shader(&self, shader: u32) -> bool {
        record!(self, "glIsShader", shader);
        self.state.borrow().is_live(ObjectKind::Shader, shader)
    }

    // ==================== Bindings ====================

    fn active_texture(&self, texture: u32) {
        self.state
            .borrow_mut()
            .set_integers(ACTIVE_TEXTURE, &[texture as i32]);
        record!(self, "glActiveTexture", texture);
    }

    fn bind_buffer(&self, target: u32, buffer: u32) {
        let pname = if target == ELEMENT_ARRAY_BUFFER {
            ELEMENT_ARRAY_BUFFER_BINDING
        } else {
            ARRAY_BUFFER_BINDING
        };
        self.state.borrow_mut().set_integers(pname, &[buffer as i32]);
        record!(self, "glBindBuffer", target, buffer);
    }

    fn bind_framebuffer(&self, target: u32, framebuffer: u32) {
        self.state
            .borrow_mut()
            .set_integers(FRAMEBUFFER_BINDING, &[framebuffer as i32]);
        record!(self, "glBindFramebuffer", target, framebuffer);
    }

    fn bind_renderbuffer(&self, target: u32, renderbuffer: u32) {
        self.state
            .borrow_mut()
            .set_integers(RENDERBUFFER_BINDING, &[renderbuffer as i32]);
        record!(self, "glBindRenderbuffer", target, renderbuffer);
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        let pname = if target == TEXTURE_CUBE_MAP {
            TEXTURE_BINDING_CUBE_MAP
        } else {
            TEXTURE_BINDING_2D
        };
        self.state.borrow_mut().set_integers(pname, &[texture as i32]);
        record!(self, "glBindTexture", target, texture);
    }

    // ==================== Fixed-function state ====================

    fn blend_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.state
            .borrow_mut()
            .floats
            .insert(BLEND_COLOR, vec![red, green, blue, alpha]);
        record!(self, "glBlendColor", red, green, blue, alpha);
    }

    fn blend_equation(&self, mode: u32) {
        {
            let mut state = self.state.borrow_mut();
            state.set_integers(BLEND_EQUATION_RGB, &[mode as i32]);
            state.set_integers(BLEND_EQUATION_ALPHA, &[mode as i32]);
        }
        record!(self, "glBlendEquation", mode);
    }

    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32) {
        {
            let mut state = self.state.borrow_mut();
            state.set_integers(BLEND_EQUATION_RGB, &[mode_rgb as i32]);
            state.set_integers(BLEND_EQUATION_ALPHA, &[mode_alpha as i32]);
        }
        record!(self, "glBlendEquationSeparate", mode_rgb, mode_alpha);
    }

    fn blend_func(&self, sfactor: u32, dfactor: u32) {
        {
            let mut state = self.state.borrow_mut();
            state.set_integers(BLEND_SRC_RGB, &[sfactor as i32]);
            state.set_integers(BLEND_SRC_ALPHA, &[sfactor as i32]);
            state.set_integers(BLEND_DST_RGB, &[dfactor as i32]);
            state.set_integers(BLEND_DST_ALPHA, &[dfactor as i32]);
        }
        record!(self, "glBlendFunc", sfactor, dfactor);
    }

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        {
            let mut state = self.state.borrow_mut();
            state.set_integers(BLEND_SRC_RGB, &[src_rgb as i32]);
            state.set_integers(BLEND_DST_RGB, &[dst_rgb as i32]);
            state.set_integers(BLEND_SRC_ALPHA, &[src_alpha as i32]);
            state.set_integers(BLEND_DST_ALPHA, &[dst_alpha as i32]);
        }
        record!(self, "glBlendFuncSeparate", src_rgb, dst_rgb, src_alpha, dst_alpha);
    }

    fn clear(&self, mask: u32) {
        record!(self, "glClear", mask);
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.state
            .borrow_mut()
            .floats
            .insert(COLOR_CLEAR_VALUE, vec![red, green, blue, alpha]);
        record!(self, "glClearColor", red, green, blue, alpha);
    }

    fn clear_depth(&self, depth: f32) {
        self.state
            .borrow_mut()
            .floats
            .insert(DEPTH_CLEAR_VALUE, vec![depth]);
        record!(self, "glClearDepthf", depth);
    }

    fn clear_stencil(&self, s: i32) {
        self.state
            .borrow_mut()
            .set_integers(STENCIL_CLEAR_VALUE, &[s]);
        record!(self, "glClearStencil", s);
    }

    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool) {
        self.state
            .borrow_mut()
            .booleans
            .insert(COLOR_WRITEMASK, vec![red, green, blue, alpha]);
        record!(self, "glColorMask", red, green, blue, alpha);
    }

    fn cull_face(&self, mode: u32) {
        self.state
            .borrow_mut()
            .set_integers(CULL_FACE_MODE, &[mode as i32]);
        record!(self, "glCullFace", mode);
    }

    fn depth_func(&self, func: u32) {
        self.state.borrow_mut().set_integers(DEPTH_FUNC, &[func as i32]);
        record!(self, "glDepthFunc", func);
    }

    fn depth_mask(&self, flag: bool) {
        self.state
            .borrow_mut()
            .booleans
            .insert(DEPTH_WRITEMASK, vec![flag]);
        record!(self, "glDepthMask", flag);
    }

    fn depth_range(&self, near: f32, far: f32) {
        self.state
            .borrow_mut()
            .floats
            .insert(DEPTH_RANGE, vec![near, far]);
        record!(self, "glDepthRangef", near, far);
    }

    fn disable(&self, cap: u32) {
        self.state.borrow_mut().capabilities.remove(&cap);
        record!(self, "glDisable", cap);
    }

    fn enable(&self, cap: u32) {
        self.state.borrow_mut().capabilities.insert(cap);
        record!(self, "glEnable", cap);
    }

    fn is_enabled(&self, cap: u32) -> bool {
        record!(self, "glIsEnabled", cap);
        self.state.borrow().capabilities.contains(&cap)
    }

    fn front_face(&self, mode: u32) {
        self.state.borrow_mut().set_integers(FRONT_FACE, &[mode as i32]);
        record!(self, "glFrontFace", mode);
    }

    fn hint(&self, target: u32, mode: u32) {
        self.state.borrow_mut().set_integers(target, &[mode as i32]);
        record!(self, "glHint", target, mode);
    }

    fn line_width(&self, width: f32) {
        self.state.borrow_mut().floats.insert(LINE_WIDTH, vec![width]);
        record!(self, "glLineWidth", width);
    }

    fn pixel_store_i(&self, pname: u32, param: i32) {
        self.state.borrow_mut().set_integers(pname, &[param]);
        record!(self, "glPixelStorei", pname, param);
    }

    fn polygon_offset(&self, factor: f32, units: f32) {
        {
            let mut state = self.state.borrow_mut();
            state.floats.insert(POLYGON_OFFSET_FACTOR, vec![factor]);
            state.floats.insert(POLYGON_OFFSET_UNITS, vec![units]);
        }
        record!(self, "glPolygonOffset", factor, units);
    }

    fn sample_coverage(&self, value: f32, invert: bool) {
        {
            let mut state = self.state.borrow_mut();
            state.floats.insert(SAMPLE_COVERAGE_VALUE, vec![value]);
            state.booleans.insert(SAMPLE_COVERAGE_INVERT, vec![invert]);
        }
        record!(self, "glSampleCoverage", value, invert);
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.state
            .borrow_mut()
            .set_integers(SCISSOR_BOX, &[x, y, width, height]);
        record!(self, "glScissor", x, y, width, height);
    }

    fn stencil_func(&self, func: u32, reference: i32, mask: u32) {
        {
            let mut state = self.state.borrow_mut();
            for (f, r, m) in [
                (STENCIL_FUNC, STENCIL_REF, STENCIL_VALUE_MASK),
                (STENCIL_BACK_FUNC, STENCIL_BACK_REF, STENCIL_BACK_VALUE_MASK),
            ] {
                state.set_integers(f, &[func as i32]);
                state.set_integers(r, &[reference]);
                state.set_integers(m, &[mask as i32]);
            }
        }
        record!(self, "glStencilFunc", func, reference, mask);
    }

    fn stencil_func_separate(&self, face: u32, func: u32, reference: i32, mask: u32) {
        record!(self, "glStencilFuncSeparate", face, func, reference, mask);
    }

    fn stencil_mask(&self, mask: u32) {
        {
            let mut state = self.state.borrow_mut();
            state.set_integers(STENCIL_WRITEMASK, &[mask as i32]);
            state.set_integers(STENCIL_BACK_WRITEMASK, &[mask as i32]);
        }
        record!(self, "glStencilMask", mask);
    }

    fn stencil_mask_separate(&self, face: u32, mask: u32) {
        record!(self, "glStencilMaskSeparate", face, mask);
    }

    fn stencil_op(&self, fail: u32, zfail: u32, zpass: u32) {
        record!(self, "glStencilOp", fail, zfail, zpass);
    }

    fn stencil_op_separate(&self, face: u32, fail: u32, zfail: u32, zpass: u32) {
        record!(self, "glStencilOpSeparate", face, fail, zfail, zpass);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.state
            .borrow_mut()
            .set_integers(VIEWPORT, &[x, y, width, height]);
        record!(self, "glViewport", x, y, width, height);
    }

    // ==================== Buffers ====================

    fn buffer_data(&self, target: u32, size: isize, data: Option<&[u8]>, usage: u32) {
        {
            let mut state = self.state.borrow_mut();
            let buffer = state.bound_buffer(target);
            if buffer != 0 {
                state.buffers.insert(buffer, (size as i32, usage));
            }
        }
        record!(self, "glBufferData", target, size, data, usage);
    }

    fn buffer_sub_data(&self, target: u32, offset: isize, data: &[u8]) {
        record!(self, "glBufferSubData", target, offset, data);
    }

    fn get_buffer_parameter_iv(&self, target: u32, pname: u32) -> i32 {
        record!(self, "glGetBufferParameteriv", target, pname);
        let state = self.state.borrow();
        let (size, usage) = state
            .buffers
            .get(&state.bound_buffer(target))
            .copied()
            .unwrap_or((0, STATIC_DRAW));
        match pname {
            BUFFER_SIZE => size,
            BUFFER_USAGE => usage as i32,
            _ => 0,
        }
    }

    // ==================== Framebuffers and renderbuffers ====================

    fn check_framebuffer_status(&self, target: u32) -> u32 {
        record!(self, "glCheckFramebufferStatus", target);
        FRAMEBUFFER_COMPLETE
    }

    fn framebuffer_renderbuffer(
        &self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: u32,
    ) {
        self.state
            .borrow_mut()
            .attachments
            .insert(attachment, (RENDERBUFFER, renderbuffer));
        record!(
            self,
            "glFramebufferRenderbuffer",
            target,
            attachment,
            renderbuffer_target,
            renderbuffer
        );
    }

    fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: u32,
        level: i32,
    ) {
        self.state
            .borrow_mut()
            .attachments
            .insert(attachment, (TEXTURE, texture));
        record!(
            self,
            "glFramebufferTexture2D",
            target,
            attachment,
            texture_target,
            texture,
            level
        );
    }

    fn get_framebuffer_attachment_parameter_iv(
        &self,
        target: u32,
        attachment: u32,
        pname: u32,
    ) -> i32 {
        record!(
            self,
            "glGetFramebufferAttachmentParameteriv",
            target,
            attachment,
            pname
        );
        let state = self.state.borrow();
        let (kind, name) = state
            .attachments
            .get(&attachment)
            .copied()
            .filter(|(_, name)| *name != 0)
            .unwrap_or((NONE, 0));
        match pname {
            FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE => kind as i32,
            FRAMEBUFFER_ATTACHMENT_OBJECT_NAME => name as i32,
            _ => 0,
        }
    }

    fn renderbuffer_storage(&self, target: u32, internal_format: u32, width: i32, height: i32) {
        {
            let mut state = self.state.borrow_mut();
            let renderbuffer = state.binding(RENDERBUFFER_BINDING);
            state
                .renderbuffers
                .insert(renderbuffer, (internal_format, width, height));
        }
        record!(
            self,
            "glRenderbufferStorage",
            target,
            internal_format,
            width,
            height
        );
    }

    fn get_renderbuffer_parameter_iv(&self, target: u32, pname: u32) -> i32 {
        record!(self, "glGetRenderbufferParameteriv", target, pname);
        let state = self.state.borrow();
        let (format, width, height) = state
            .renderbuffers
            .get(&state.binding(RENDERBUFFER_BINDING))
            .copied()
            .unwrap_or((RGBA4, 0, 0));
        match pname {
            RENDERBUFFER_WIDTH => width,
            RENDERBUFFER_HEIGHT => height,
            RENDERBUFFER_INTERNAL_FORMAT => format as i32,
            _ => 0,
        }
    }

    // ==================== Textures ====================

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
    ) {
        record!(
            self,
            "glCopyTexImage2D",
            target,
            level,
            internal_format,
            x,
            y,
            width,
            height,
            border
        );
    }

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
    ) {
        record!(
            self,
            "glCopyTexSubImage2D",
            target,
            level,
            xoffset,
            yoffset,
            x,
            y,
            width,
            height
        );
    }

    fn generate_mipmap(&self, target: u32) {
        record!(self, "glGenerateMipmap", target);
    }

    fn get_tex_parameter_iv(&self, target: u32, pname: u32) -> i32 {
        record!(self, "glGetTexParameteriv", target, pname);
        let state = self.state.borrow();
        let texture = state.bound_texture(target);
        state
            .tex_params
            .get(&(texture, pname))
            .copied()
            .unwrap_or(match pname {
                TEXTURE_MIN_FILTER => NEAREST_MIPMAP_LINEAR as i32,
                TEXTURE_MAG_FILTER => LINEAR as i32,
                _ => REPEAT as i32,
            })
    }

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
    ) {
        record!(
            self,
            "glTexImage2D",
            target,
            level,
            internal_format,
            width,
            height,
            border,
            format,
            type_,
            pixels
        );
    }

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
    ) {
        record!(
            self,
            "glTexSubImage2D",
            target,
            level,
            xoffset,
            yoffset,
            width,
            height,
            format,
            type_,
            pixels
        );
    }

    fn tex_parameter_f(&self, target: u32, pname: u32, param: f32) {
        {
            let mut state = self.state.borrow_mut();
            let texture = state.bound_texture(target);
            state.tex_params.insert((texture, pname), param as i32);
        }
        record!(self, "glTexParameterf", target, pname, param);
    }

    fn tex_parameter_i(&self, target: u32, pname: u32, param: i32) {
        {
            let mut state = self.state.borrow_mut();
            let texture = state.bound_texture(target);
            state.tex_params.insert((texture, pname), param);
        }
        record!(self, "glTexParameteri", target, pname, param);
    }

    // ==================== Programs and shaders ====================

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program) {
            if !record.shaders.contains(&shader) {
                record.shaders.push(shader);
            }
        }
        record!(self, "glAttachShader", program, shader);
    }

    fn bind_attrib_location(&self, program: u32, index: u32, name: &str) {
        record!(self, "glBindAttribLocation", program, index, name);
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(record) = self.state.borrow_mut().shaders.get_mut(&shader) {
            record.compiled = !record.source.is_empty();
        }
        record!(self, "glCompileShader", shader);
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program) {
            record.shaders.retain(|s| *s != shader);
        }
        record!(self, "glDetachShader", program, shader);
    }

    fn get_active_attrib(&self, program: u32, index: u32) -> Option<ActiveInfo> {
        record!(self, "glGetActiveAttrib", program, index);
        self.state
            .borrow()
            .programs
            .get(&program)?
            .attribs
            .get(index as usize)
            .cloned()
    }

    fn get_active_uniform(&self, program: u32, index: u32) -> Option<ActiveInfo> {
        record!(self, "glGetActiveUniform", program, index);
        self.state
            .borrow()
            .programs
            .get(&program)?
            .uniforms
            .get(index as usize)
            .map(|uniform| uniform.info.clone())
    }

    fn get_attached_shaders(&self, program: u32) -> Vec<u32> {
        record!(self, "glGetAttachedShaders", program);
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|record| record.shaders.clone())
            .unwrap_or_default()
    }

    fn get_attrib_location(&self, program: u32, name: &str) -> i32 {
        record!(self, "glGetAttribLocation", program, name);
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|record| record.attribs.iter().position(|a| a.name == name))
            .map_or(-1, |index| index as i32)
    }

    fn get_program_iv(&self, program: u32, pname: u32) -> i32 {
        record!(self, "glGetProgramiv", program, pname);
        let state = self.state.borrow();
        let Some(record) = state.programs.get(&program) else {
            return 0;
        };
        match pname {
            LINK_STATUS => record.linked as i32,
            VALIDATE_STATUS => record.validated as i32,
            DELETE_STATUS => 0,
            ATTACHED_SHADERS => record.shaders.len() as i32,
            ACTIVE_UNIFORMS => record.uniforms.len() as i32,
            ACTIVE_ATTRIBUTES => record.attribs.len() as i32,
            _ => 0,
        }
    }

    fn get_program_info_log(&self, program: u32) -> String {
        record!(self, "glGetProgramInfoLog", program);
        String::new()
    }

    fn get_shader_iv(&self, shader: u32, pname: u32) -> i32 {
        record!(self, "glGetShaderiv", shader, pname);
        let state = self.state.borrow();
        let Some(record) = state.shaders.get(&shader) else {
            return 0;
        };
        match pname {
            SHADER_TYPE => record.shader_type as i32,
            COMPILE_STATUS => record.compiled as i32,
            _ => 0,
        }
    }

    fn get_shader_info_log(&self, shader: u32) -> String {
        record!(self, "glGetShaderInfoLog", shader);
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|record| record.info_log.clone())
            .unwrap_or_default()
    }

    fn get_uniform_location(&self, program: u32, name: &str) -> i32 {
        record!(self, "glGetUniformLocation", program, name);
        let state = self.state.borrow();
        let Some(record) = state.programs.get(&program) else {
            return -1;
        };
        for uniform in &record.uniforms {
            let base = uniform
                .info
                .name
                .strip_suffix("[0]")
                .unwrap_or(&uniform.info.name);
            if name == uniform.info.name || name == base {
                return uniform.location;
            }
            for element in 0..uniform.info.size.max(1) {
                if name == format!("{}[{}]", base, element) {
                    return uniform.location + element;
                }
            }
        }
        -1
    }

    fn get_uniform_fv(&self, program: u32, location: i32, values: &mut [f32]) {
        record!(self, "glGetUniformfv", program, location);
        let stored = self.state.borrow().load_uniform(program, location);
        for (out, value) in values.iter_mut().zip(stored) {
            *out = value;
        }
    }

    fn get_uniform_iv(&self, program: u32, location: i32, values: &mut [i32]) {
        record!(self, "glGetUniformiv", program, location);
        let stored = self.state.borrow().load_uniform(program, location);
        for (out, value) in values.iter_mut().zip(stored) {
            *out = value as i32;
        }
    }

    fn link_program(&self, program: u32) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program) {
            record.linked = true;
        }
        record!(self, "glLinkProgram", program);
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(record) = self.state.borrow_mut().shaders.get_mut(&shader) {
            record.source = source.to_string();
        }
        record!(self, "glShaderSource", shader, source);
    }

    fn use_program(&self, program: u32) {
        self.state
            .borrow_mut()
            .set_integers(CURRENT_PROGRAM, &[program as i32]);
        record!(self, "glUseProgram", program);
    }

    fn validate_program(&self, program: u32) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program) {
            record.validated = record.linked;
        }
        record!(self, "glValidateProgram", program);
    }

    // ==================== Uniforms ====================

    fn uniform_1f(&self, location: i32, x: f32) {
        self.state.borrow_mut().store_uniform(location, 1, &[x]);
        record!(self, "glUniform1f", location, x);
    }

    fn uniform_2f(&self, location: i32, x: f32, y: f32) {
        self.state.borrow_mut().store_uniform(location, 1, &[x, y]);
        record!(self, "glUniform2f", location, x, y);
    }

    fn uniform_3f(&self, location: i32, x: f32, y: f32, z: f32) {
        self.state.borrow_mut().store_uniform(location, 1, &[x, y, z]);
        record!(self, "glUniform3f", location, x, y, z);
    }

    fn uniform_4f(&self, location: i32, x: f32, y: f32, z: f32, w: f32) {
        self.state
            .borrow_mut()
            .store_uniform(location, 1, &[x, y, z, w]);
        record!(self, "glUniform4f", location, x, y, z, w);
    }

    fn uniform_1i(&self, location: i32, x: i32) {
        self.state
            .borrow_mut()
            .store_uniform(location, 1, &[x as f32]);
        record!(self, "glUniform1i", location, x);
    }

    fn uniform_2i(&self, location: i32, x: i32, y: i32) {
        self.state
            .borrow_mut()
            .store_uniform(location, 1, &[x as f32, y as f32]);
        record!(self, "glUniform2i", location, x, y);
    }

    fn uniform_3i(&self, location: i32, x: i32, y: i32, z: i32) {
        self.state
            .borrow_mut()
            .store_uniform(location, 1, &[x as f32, y as f32, z as f32]);
        record!(self, "glUniform3i", location, x, y, z);
    }

    fn uniform_4i(&self, location: i32, x: i32, y: i32, z: i32, w: i32) {
        self.state
            .borrow_mut()
            .store_uniform(location, 1, &[x as f32, y as f32, z as f32, w as f32]);
        record!(self, "glUniform4i", location, x, y, z, w);
    }

    fn uniform_1fv(&self, location: i32, count: i32, values: &[f32]) {
        self.state
            .borrow_mut()
            .store_uniform(location, count as usize, values);
        record!(self, "glUniform1fv", location, count, values);
    }

    fn uniform_2fv(&self, location: i32, count: i32, values: &[f32]) {
        self.state
            .borrow_mut()
            .store_uniform(location, count as usize, values);
        record!(self, "glUniform2fv", location, count, values);
    }

    fn uniform_3fv(&self, location: i32, count: i32, values: &[f32]) {
        self.state
            .borrow_mut()
            .store_uniform(location, count as usize, values);
        record!(self, "glUniform3fv", location, count, values);
    }

    fn uniform_4fv(&self, location: i32, count: i32, values: &[f32]) {
        self.state
            .borrow_mut()
            .store_uniform(location, count as usize, values);
        record!(self, "glUniform4fv", location, count, values);
    }

    fn uniform_1iv(&self, location: i32, count: i32, values: &[i32]) {
        let floats: Vec<f32> = values.iter().map(|v| *v as f32).collect();
        self.state
            .borrow_mut()
            .store_uniform(location, count as usize, &floats);
        record!(self, "glUniform1iv", location, count, values);
    }

    fn uniform_2iv(&self, location: i32, count: i32, values: &[i32]) {
        let floats: Vec<f32> = values.iter().map(|v| *v as f32).collect();
        self.state
            .borrow_mut()
            .store_uniform(location, count as usize, &floats);
        record!(self, "glUniform2iv", location, count, values);
    }

    fn uniform_3iv(&self, location: i32, count: i32, values: &[i32]) {
        let floats: Vec<f32> = values.iter().map(|v| *v as f32).collect();
        self.state
            .borrow_mut()
            .store_uniform(location, count as usize, &floats);
        record!(self, "glUniform3iv", location, count, values);
    }

    fn uniform_4iv(&self, location: i32, count: i32, values: &[i32]) {
        let floats: Vec<f32> = values.iter().map(|v| *v as f32).collect();
        self.state
            .borrow_mut()
            .store_uniform(location, count as usize, &floats);
        record!(self, "glUniform4iv", location, count, values);
    }

    fn uniform_matrix_2fv(&self, location: i32, count: i32, transpose: bool, values: &[f32]) {
        self.state
            .borrow_mut()
            .store_uniform(location, count as usize, values);
        record!(self, "glUniformMatrix2fv", location, count, transpose, values);
    }

    fn uniform_matrix_3fv(&self, location: i32, count: i32, transpose: bool, values: &[f32]) {
        self.state
            .borrow_mut()
            .store_uniform(location, count as usize, values);
        record!(self, "glUniformMatrix3fv", location, count, transpose, values);
    }

    fn uniform_matrix_4fv(&self, location: i32, count: i32, transpose: bool, values: &[f32]) {
        self.state
            .borrow_mut()
            .store_uniform(location, count as usize, values);
        record!(self, "glUniformMatrix4fv", location, count, transpose, values);
    }

    // ==================== Vertex attributes ====================

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.state.borrow_mut().attrib(index).enabled = false;
        record!(self, "glDisableVertexAttribArray", index);
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.state.borrow_mut().attrib(index).enabled = true;
        record!(self, "glEnableVertexAttribArray", index);
    }

    fn get_vertex_attrib_fv(&self, index: u32, pname: u32, values: &mut [f32]) {
        record!(self, "glGetVertexAttribfv", index, pname);
        if pname == CURRENT_VERTEX_ATTRIB {
            let current = self.state.borrow_mut().attrib(index).current;
            for (out, value) in values.iter_mut().zip(current) {
                *out = value;
            }
        }
    }

    fn get_vertex_attrib_iv(&self, index: u32, pname: u32) -> i32 {
        record!(self, "glGetVertexAttribiv", index, pname);
        let mut state = self.state.borrow_mut();
        let attrib = state.attrib(index);
        match pname {
            VERTEX_ATTRIB_ARRAY_ENABLED => attrib.enabled as i32,
            VERTEX_ATTRIB_ARRAY_SIZE => attrib.size,
            VERTEX_ATTRIB_ARRAY_STRIDE => attrib.stride,
            VERTEX_ATTRIB_ARRAY_TYPE => attrib.type_ as i32,
            VERTEX_ATTRIB_ARRAY_NORMALIZED => attrib.normalized as i32,
            VERTEX_ATTRIB_ARRAY_BUFFER_BINDING => attrib.buffer as i32,
            _ => 0,
        }
    }

    fn get_vertex_attrib_offset(&self, index: u32, pname: u32) -> usize {
        record!(self, "glGetVertexAttribPointerv", index, pname);
        self.state.borrow_mut().attrib(index).offset as usize
    }

    fn vertex_attrib_1f(&self, index: u32, x: f32) {
        self.state.borrow_mut().attrib(index).current = [x, 0.0, 0.0, 1.0];
        record!(self, "glVertexAttrib1f", index, x);
    }

    fn vertex_attrib_2f(&self, index: u32, x: f32, y: f32) {
        self.state.borrow_mut().attrib(index).current = [x, y, 0.0, 1.0];
        record!(self, "glVertexAttrib2f", index, x, y);
    }

    fn vertex_attrib_3f(&self, index: u32, x: f32, y: f32, z: f32) {
        self.state.borrow_mut().attrib(index).current = [x, y, z, 1.0];
        record!(self, "glVertexAttrib3f", index, x, y, z);
    }

    fn vertex_attrib_4f(&self, index: u32, x: f32, y: f32, z: f32, w: f32) {
        self.state.borrow_mut().attrib(index).current = [x, y, z, w];
        record!(self, "glVertexAttrib4f", index, x, y, z, w);
    }

    fn vertex_attrib_1fv(&self, index: u32, values: &[f32]) {
        self.state.borrow_mut().attrib(index).current = [values[0], 0.0, 0.0, 1.0];
        record!(self, "glVertexAttrib1fv", index, values);
    }

    fn vertex_attrib_2fv(&self, index: u32, values: &[f32]) {
        self.state.borrow_mut().attrib(index).current = [values[0], values[1], 0.0, 1.0];
        record!(self, "glVertexAttrib2fv", index, values);
    }

    fn vertex_attrib_3fv(&self, index: u32, values: &[f32]) {
        self.state.borrow_mut().attrib(index).current = [values[0], values[1], values[2], 1.0];
        record!(self, "glVertexAttrib3fv", index, values);
    }

    fn vertex_attrib_4fv(&self, index: u32, values: &[f32]) {
        self.state.borrow_mut().attrib(index).current =
            [values[0], values[1], values[2], values[3]];
        record!(self, "glVertexAttrib4fv", index, values);
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        type_: u32,
        normalized: bool,
        stride: i32,
        offset: isize,
    ) {
        {
            let mut state = self.state.borrow_mut();
            let buffer = state.binding(ARRAY_BUFFER_BINDING);
            let attrib = state.attrib(index);
            attrib.size = size;
            attrib.type_ = type_;
            attrib.normalized = normalized;
            attrib.stride = stride;
            attrib.offset = offset;
            attrib.buffer = buffer;
        }
        record!(
            self,
            "glVertexAttribPointer",
            index,
            size,
            type_,
            normalized,
            stride,
            offset
        );
    }

    // ==================== Drawing ====================

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        record!(self, "glDrawArrays", mode, first, count);
    }

    fn draw_elements(&self, mode: u32, count: i32, type_: u32, offset: isize) {
        record!(self, "glDrawElements", mode, count, type_, offset);
    }

    fn finish(&self) {
        record!(self, "glFinish");
    }

    fn flush(&self) {
        record!(self, "glFlush");
    }

    fn read_pixels(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        type_: u32,
        pixels: &mut [u8],
    ) {
        // Every pixel reads back as the clear color.
        let color: Vec<u8> = self
            .state
            .borrow()
            .floats
            .get(&COLOR_CLEAR_VALUE)
            .map(|c| c.iter().map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8).collect())
            .unwrap_or_else(|| vec![0; 4]);
        for pixel in pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
        record!(self, "glReadPixels", x, y, width, height, format, type_);
    }

    // ==================== Queries ====================

    fn get_boolean_v(&self, pname: u32, values: &mut [bool]) {
        record!(self, "glGetBooleanv", pname);
        let state = self.state.borrow();
        match state.booleans.get(&pname) {
            Some(stored) => {
                for (out, value) in values.iter_mut().zip(stored) {
                    *out = *value;
                }
            }
            None => {
                if let Some(first) = values.first_mut() {
                    *first = state.capabilities.contains(&pname);
                }
            }
        }
    }

    fn get_float_v(&self, pname: u32, values: &mut [f32]) {
        record!(self, "glGetFloatv", pname);
        if let Some(stored) = self.state.borrow().floats.get(&pname) {
            for (out, value) in values.iter_mut().zip(stored) {
                *out = *value;
            }
        }
    }

    fn get_integer_v(&self, pname: u32, values: &mut [i32]) {
        record!(self, "glGetIntegerv", pname);
        if let Some(stored) = self.state.borrow().integers.get(&pname) {
            for (out, value) in values.iter_mut().zip(stored) {
                *out = *value;
            }
        }
    }

    fn get_string(&self, pname: u32) -> String {
        record!(self, "glGetString", pname);
        self.state
            .borrow()
            .strings
            .get(&pname)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let driver = RecordingDriver::new();
        let view = driver.clone();

        driver.clear(COLOR_BUFFER_BIT);
        assert_eq!(
            view.calls(),
            vec![GlCall {
                name: "glClear",
                args: vec![CallArg::Int(COLOR_BUFFER_BIT as i64)],
            }]
        );
    }

    #[test]
    fn test_names_are_tracked() {
        let driver = RecordingDriver::new();
        let buffer = driver.gen_buffer();
        let texture = driver.gen_texture();
        assert_ne!(buffer, texture);
        assert!(driver.is_buffer(buffer));
        assert!(!driver.is_buffer(texture));

        driver.bind_buffer(ARRAY_BUFFER, buffer);
        driver.delete_buffer(buffer);
        assert!(!driver.is_buffer(buffer));

        let mut bound = [7];
        driver.get_integer_v(ARRAY_BUFFER_BINDING, &mut bound);
        assert_eq!(bound, [0]);
    }

    #[test]
    fn test_error_queue() {
        let driver = RecordingDriver::new();
        driver.push_error(INVALID_ENUM);
        assert_eq!(driver.get_error(), INVALID_ENUM);
        assert_eq!(driver.get_error(), NO_ERROR);
    }

    #[test]
    fn test_uniform_locations_cover_array_elements() {
        let driver = RecordingDriver::new();
        let program = driver.create_program();
        let scale = driver.add_uniform(program, "scale", FLOAT, 1);
        let colors = driver.add_uniform(program, "colors[0]", FLOAT_VEC4, 3);

        assert_eq!(driver.get_uniform_location(program, "scale"), scale);
        assert_eq!(driver.get_uniform_location(program, "colors"), colors);
        assert_eq!(driver.get_uniform_location(program, "colors[2]"), colors + 2);
        assert_eq!(driver.get_uniform_location(program, "colors[3]"), -1);
        assert_eq!(driver.get_uniform_location(program, "missing"), -1);
    }

    #[test]
    fn test_uniform_values_follow_current_program() {
        let driver = RecordingDriver::new();
        let program = driver.create_program();
        let location = driver.add_uniform(program, "offset", FLOAT_VEC2, 1);

        driver.use_program(program);
        driver.uniform_2f(location, 0.5, -1.0);

        let mut values = [0.0; 2];
        driver.get_uniform_fv(program, location, &mut values);
        assert_eq!(values, [0.5, -1.0]);
    }

    #[test]
    fn test_read_pixels_returns_clear_color() {
        let driver = RecordingDriver::new();
        driver.clear_color(1.0, 0.0, 0.0, 1.0);
        let mut pixels = [0_u8; 8];
        driver.read_pixels(0, 0, 2, 1, RGBA, UNSIGNED_BYTE, &mut pixels);
        assert_eq!(pixels, [255, 0, 0, 255, 255, 0, 0, 255]);
    }

    #[test]
    fn test_capabilities() {
        let driver = RecordingDriver::new();
        assert!(driver.is_enabled(DITHER));
        driver.enable(BLEND);
        let mut value = [false];
        driver.get_boolean_v(BLEND, &mut value);
        assert!(value[0]);
    }
}
