//! Script-visible graphics objects.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use webgl_js::{JsObject, JsValue};

// ==================== Context IDs ====================

/// Process-unique identifier of a rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u32);

impl ContextId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU32 = AtomicU32::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

// ==================== Kinds ====================

/// Variant of a graphics object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Buffer,
    Framebuffer,
    Renderbuffer,
    Program,
    Shader,
    Texture,
    UniformLocation,
    ActiveInfo,
}

impl ObjectKind {
    /// Kinds that carry a driver-issued name and live in the registry.
    pub const NAMED: [ObjectKind; 6] = [
        ObjectKind::Buffer,
        ObjectKind::Framebuffer,
        ObjectKind::Renderbuffer,
        ObjectKind::Program,
        ObjectKind::Shader,
        ObjectKind::Texture,
    ];

    /// Script-visible interface name.
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Buffer => "WebGLBuffer",
            ObjectKind::Framebuffer => "WebGLFramebuffer",
            ObjectKind::Renderbuffer => "WebGLRenderbuffer",
            ObjectKind::Program => "WebGLProgram",
            ObjectKind::Shader => "WebGLShader",
            ObjectKind::Texture => "WebGLTexture",
            ObjectKind::UniformLocation => "WebGLUniformLocation",
            ObjectKind::ActiveInfo => "WebGLActiveInfo",
        }
    }
}

// ==================== Per-kind state ====================

/// Shader source and the result of the last translation.
#[derive(Debug, Clone, Default)]
pub struct ShaderState {
    pub shader_type: u32,
    pub source: String,
    pub valid: bool,
    pub log: String,
}

/// Size, type and name of an active attribute or uniform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveInfo {
    pub size: i32,
    pub type_: u32,
    pub name: String,
}

#[derive(Debug)]
enum Detail {
    None,
    Shader(RefCell<ShaderState>),
    UniformLocation { program: u32, location: i32 },
    ActiveInfo(ActiveInfo),
}

// ==================== Objects ====================

/// A graphics object handed to scripts.
///
/// The native id reads as 0 once the object is deleted; the wrapper stays
/// valid as a value for as long as scripts hold it.
pub struct WebGLObject {
    kind: ObjectKind,
    id: u32,
    context: ContextId,
    deleted: Cell<bool>,
    detail: Detail,
}

impl WebGLObject {
    /// Wrap a driver-issued name.
    pub(crate) fn named(kind: ObjectKind, id: u32, context: ContextId) -> Self {
        Self {
            kind,
            id,
            context,
            deleted: Cell::new(false),
            detail: Detail::None,
        }
    }

    pub(crate) fn shader(id: u32, shader_type: u32, context: ContextId) -> Self {
        Self {
            detail: Detail::Shader(RefCell::new(ShaderState {
                shader_type,
                ..Default::default()
            })),
            ..Self::named(ObjectKind::Shader, id, context)
        }
    }

    pub(crate) fn uniform_location(program: u32, location: i32, context: ContextId) -> Self {
        Self {
            detail: Detail::UniformLocation { program, location },
            ..Self::named(ObjectKind::UniformLocation, 0, context)
        }
    }

    pub(crate) fn active_info(info: ActiveInfo, context: ContextId) -> Self {
        Self {
            detail: Detail::ActiveInfo(info),
            ..Self::named(ObjectKind::ActiveInfo, 0, context)
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Native id as observed by handlers: 0 after deletion.
    pub fn webgl_id(&self) -> u32 {
        if self.deleted.get() {
            0
        } else {
            self.id
        }
    }

    /// Native id regardless of deletion, for freeing.
    pub(crate) fn native_id(&self) -> u32 {
        self.id
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.get()
    }

    pub(crate) fn mark_deleted(&self) {
        self.deleted.set(true);
    }

    /// Shader state, for shader objects.
    pub fn shader_state(&self) -> Option<Ref<'_, ShaderState>> {
        match &self.detail {
            Detail::Shader(state) => Some(state.borrow()),
            _ => None,
        }
    }

    pub(crate) fn update_shader(&self, f: impl FnOnce(&mut ShaderState)) {
        if let Detail::Shader(state) = &self.detail {
            f(&mut state.borrow_mut());
        }
    }

    /// `(program id, location)` for uniform locations.
    pub fn uniform_location_parts(&self) -> Option<(u32, i32)> {
        match self.detail {
            Detail::UniformLocation { program, location } => Some((program, location)),
            _ => None,
        }
    }

    pub fn active_info_data(&self) -> Option<&ActiveInfo> {
        match &self.detail {
            Detail::ActiveInfo(info) => Some(info),
            _ => None,
        }
    }

    /// Hand the object to the script host.
    pub fn to_js(self: &Rc<Self>) -> JsValue {
        JsValue::Object(JsObject::new(Rc::clone(self)))
    }

    /// Recover an object from a host value.
    pub fn from_js(value: &JsValue) -> Option<Rc<Self>> {
        value.as_object().and_then(JsObject::downcast::<WebGLObject>)
    }
}

impl fmt::Debug for WebGLObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.kind.name())
            .field("id", &self.id)
            .field("context", &self.context.raw())
            .field("deleted", &self.deleted.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_ids_are_unique() {
        assert_ne!(ContextId::new(), ContextId::new());
    }

    #[test]
    fn test_deleted_object_reads_zero() {
        let buffer = WebGLObject::named(ObjectKind::Buffer, 7, ContextId::new());
        assert_eq!(buffer.webgl_id(), 7);
        buffer.mark_deleted();
        assert_eq!(buffer.webgl_id(), 0);
        assert_eq!(buffer.native_id(), 7);
    }

    #[test]
    fn test_shader_state_updates() {
        let shader = WebGLObject::shader(3, crate::constants::VERTEX_SHADER, ContextId::new());
        shader.update_shader(|state| state.source = "void main() {}".to_string());
        let state = shader.shader_state().unwrap();
        assert_eq!(state.source, "void main() {}");
        assert_eq!(state.shader_type, crate::constants::VERTEX_SHADER);
        assert!(!state.valid);
    }

    #[test]
    fn test_js_round_trip_keeps_identity() {
        let texture = Rc::new(WebGLObject::named(ObjectKind::Texture, 1, ContextId::new()));
        let value = texture.to_js();
        let back = WebGLObject::from_js(&value).unwrap();
        assert!(Rc::ptr_eq(&texture, &back));
        assert!(WebGLObject::from_js(&JsValue::Null).is_none());
    }
}
