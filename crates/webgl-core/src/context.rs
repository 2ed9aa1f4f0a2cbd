//! The rendering context.

use std::rc::Rc;

use tracing::{info, trace};

use crate::config::ContextConfig;
use crate::constants::*;
use crate::dispatch;
use crate::driver::GlDriver;
use crate::error::ErrorChannel;
use crate::marshal::Arguments;
use crate::objects::{ContextId, ObjectKind, WebGLObject};
use crate::registry::Registry;
use crate::translator::{PassthroughTranslator, ShaderTranslator};
use crate::validate::Validator;
use crate::{BindingError, JsValue};

/// Pixel-store state tracked on the WebGL side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PixelStore {
    pub pack_alignment: i32,
    pub unpack_alignment: i32,
    pub flip_y: bool,
    pub premultiply_alpha: bool,
    pub colorspace_conversion: u32,
}

impl Default for PixelStore {
    fn default() -> Self {
        Self {
            pack_alignment: 4,
            unpack_alignment: 4,
            flip_y: false,
            premultiply_alpha: false,
            colorspace_conversion: BROWSER_DEFAULT_WEBGL,
        }
    }
}

/// One WebGL rendering context.
///
/// Scripts reach it through [`call`](Self::call) with a method name and
/// host values. Dropping the context deletes every object it still owns.
pub struct RenderingContext {
    id: ContextId,
    driver: Box<dyn GlDriver>,
    translator: Box<dyn ShaderTranslator>,
    config: ContextConfig,
    registry: Registry,
    errors: ErrorChannel,
    pub(crate) pixel_store: PixelStore,
    pub(crate) current_program: u32,
    /// Deleted while in use; stays current until `useProgram` replaces it.
    pub(crate) retired_program: Option<Rc<WebGLObject>>,
}

impl RenderingContext {
    pub fn new(driver: impl GlDriver + 'static, config: ContextConfig) -> Self {
        let id = ContextId::new();
        info!(
            context = id.raw(),
            vendor = %config.vendor,
            renderer = %config.renderer,
            "Rendering context created"
        );
        Self {
            id,
            driver: Box::new(driver),
            translator: Box::new(PassthroughTranslator),
            config,
            registry: Registry::new(id),
            errors: ErrorChannel::new(),
            pixel_store: PixelStore::default(),
            current_program: 0,
            retired_program: None,
        }
    }

    /// A context with the default configuration.
    pub fn with_driver(driver: impl GlDriver + 'static) -> Self {
        Self::new(driver, ContextConfig::default())
    }

    /// Replace the shader translator used by `compileShader`.
    pub fn set_translator(&mut self, translator: impl ShaderTranslator + 'static) {
        self.translator = Box::new(translator);
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The sticky error, without reading it the way `getError` does.
    pub fn pending_error(&self) -> u32 {
        self.errors.current()
    }

    /// Invoke a WebGL method by name.
    ///
    /// Type errors come back as `Err`; WebGL errors are posted to the
    /// context and read with `getError`.
    pub fn call(&mut self, method: &str, args: &[JsValue]) -> Result<JsValue, BindingError> {
        let Some((name, handler)) = dispatch::lookup(method) else {
            return Err(BindingError::UnknownMethod(method.to_string()));
        };

        self.driver.make_current();
        trace!(context = self.id.raw(), method = name, argc = args.len(), "Dispatch");

        handler(self, &Arguments::new(args))
            .map_err(|source| BindingError::Type { method: name, source })
    }

    // ==================== Handler access ====================

    pub(crate) fn driver(&self) -> &dyn GlDriver {
        self.driver.as_ref()
    }

    pub(crate) fn translator(&self) -> &dyn ShaderTranslator {
        self.translator.as_ref()
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub(crate) fn validator(&self) -> Validator<'_> {
        Validator::new(&self.errors, self.id)
    }

    pub(crate) fn set_error(&self, code: u32) {
        self.errors.set(code);
    }

    /// `getError`: sticky code first, then the driver's queue.
    pub(crate) fn take_error(&self) -> u32 {
        self.errors
            .take(self.driver.as_ref(), self.config.error_drain_limit)
    }

    /// First integer the driver reports for `pname`.
    pub(crate) fn integer(&self, pname: u32) -> i32 {
        let mut value = [0];
        self.driver.get_integer_v(pname, &mut value);
        value[0]
    }

    /// Wrapper for a native name, or `null`.
    pub(crate) fn lookup_js(&self, kind: ObjectKind, id: u32) -> JsValue {
        let retired = self
            .retired_program
            .as_ref()
            .filter(|program| kind == ObjectKind::Program && id != 0 && program.native_id() == id);
        self.registry
            .lookup(kind, id)
            .or_else(|| retired.cloned())
            .map_or(JsValue::Null, |object| object.to_js())
    }
}

/// Issue the driver delete for a named kind. Id 0 is forwarded as is.
pub(crate) fn delete_native(driver: &dyn GlDriver, kind: ObjectKind, id: u32) {
    match kind {
        ObjectKind::Buffer => driver.delete_buffer(id),
        ObjectKind::Framebuffer => driver.delete_framebuffer(id),
        ObjectKind::Renderbuffer => driver.delete_renderbuffer(id),
        ObjectKind::Program => driver.delete_program(id),
        ObjectKind::Shader => driver.delete_shader(id),
        ObjectKind::Texture => driver.delete_texture(id),
        ObjectKind::UniformLocation | ObjectKind::ActiveInfo => {}
    }
}

impl Drop for RenderingContext {
    fn drop(&mut self) {
        let objects: Vec<Rc<WebGLObject>> = self.registry.drain();
        if !objects.is_empty() {
            self.driver.make_current();
        }
        for object in &objects {
            delete_native(self.driver.as_ref(), object.kind(), object.native_id());
        }
        info!(
            context = self.id.raw(),
            released = objects.len(),
            "Rendering context dropped"
        );
    }
}

impl std::fmt::Debug for RenderingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderingContext")
            .field("id", &self.id.raw())
            .field("config", &self.config)
            .field("pending_error", &self.errors.current())
            .field("current_program", &self.current_program)
            .finish()
    }
}
