//! # WebGL Core
//!
//! WebGL 1.0 binding and validation layer.
//!
//! ## Features
//!
//! - **RenderingContext**: one context per drawing surface, reached by
//!   method name with host values as arguments
//! - **Validation**: WebGL enum whitelists, object ownership, array sizing
//! - **Objects**: buffers, textures, framebuffers, renderbuffers, programs,
//!   shaders, uniform locations and active infos handed to scripts as
//!   wrappers
//! - **Shader translation**: sources pass through a [`ShaderTranslator`]
//!   before reaching the driver
//!
//! ## Architecture
//!
//! Native calls go through the [`GlDriver`] trait. [`RecordingDriver`] is a
//! headless driver that records every call, used by hosts without a GPU
//! and by the tests.

use thiserror::Error;

pub mod config;
pub mod constants;
pub mod context;
pub mod driver;
pub mod error;
pub mod logging;
pub mod marshal;
pub mod objects;
pub mod recording;
pub mod registry;
pub mod translator;
pub mod validate;

mod api;
mod array_call;
mod dispatch;
mod parameters;

pub use config::{ContextAttributes, ContextConfig};
pub use context::RenderingContext;
pub use driver::GlDriver;
pub use error::ErrorChannel;
pub use marshal::Arguments;
pub use objects::{ActiveInfo, ContextId, ObjectKind, ShaderState, WebGLObject};
pub use recording::{CallArg, GlCall, RecordingDriver};
pub use registry::Registry;
pub use translator::{PassthroughTranslator, ShaderTranslator, Translation};
pub use validate::Validator;
pub use webgl_js::{JsObject, JsValue, TypedArray, TypedArrayKind};

// ==================== Errors ====================

/// Errors that can occur in WebGL operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebGLError {
    #[error("Invalid enum")]
    InvalidEnum,

    #[error("Invalid value")]
    InvalidValue,

    #[error("Invalid operation")]
    InvalidOperation,

    #[error("Out of memory")]
    OutOfMemory,

    #[error("Invalid framebuffer operation")]
    InvalidFramebufferOperation,

    #[error("Context lost")]
    ContextLost,
}

impl WebGLError {
    /// The GL error code for this error.
    pub fn code(self) -> u32 {
        match self {
            WebGLError::InvalidEnum => constants::INVALID_ENUM,
            WebGLError::InvalidValue => constants::INVALID_VALUE,
            WebGLError::InvalidOperation => constants::INVALID_OPERATION,
            WebGLError::OutOfMemory => constants::OUT_OF_MEMORY,
            WebGLError::InvalidFramebufferOperation => constants::INVALID_FRAMEBUFFER_OPERATION,
            WebGLError::ContextLost => constants::CONTEXT_LOST_WEBGL,
        }
    }

    /// Map a GL error code back. `NO_ERROR` and unknown codes give `None`.
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            constants::INVALID_ENUM => WebGLError::InvalidEnum,
            constants::INVALID_VALUE => WebGLError::InvalidValue,
            constants::INVALID_OPERATION => WebGLError::InvalidOperation,
            constants::OUT_OF_MEMORY => WebGLError::OutOfMemory,
            constants::INVALID_FRAMEBUFFER_OPERATION => WebGLError::InvalidFramebufferOperation,
            constants::CONTEXT_LOST_WEBGL => WebGLError::ContextLost,
            _ => return None,
        })
    }
}

/// An argument could not be converted to the type a method declares.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("argument {index}: expected {expected}, found {found}")]
pub struct TypeError {
    pub index: usize,
    pub expected: &'static str,
    pub found: &'static str,
}

impl TypeError {
    pub fn new(expected: &'static str, found: &'static str) -> Self {
        Self {
            index: 0,
            expected,
            found,
        }
    }

    /// Attach the position of the offending argument.
    pub fn at(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

/// Errors surfaced to the script host as thrown exceptions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("{method}: {source}")]
    Type {
        method: &'static str,
        #[source]
        source: TypeError,
    },

    #[error("Unknown method: {0}")]
    UnknownMethod(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_round_trip() {
        for error in [
            WebGLError::InvalidEnum,
            WebGLError::InvalidValue,
            WebGLError::InvalidOperation,
            WebGLError::OutOfMemory,
            WebGLError::InvalidFramebufferOperation,
            WebGLError::ContextLost,
        ] {
            assert_eq!(WebGLError::from_code(error.code()), Some(error));
        }
        assert_eq!(WebGLError::from_code(constants::NO_ERROR), None);
    }

    #[test]
    fn test_type_error_message() {
        let error = TypeError::new("WebGLBuffer", "number").at(1);
        assert_eq!(error.to_string(), "argument 1: expected WebGLBuffer, found number");

        let binding = BindingError::Type {
            method: "bindBuffer",
            source: error,
        };
        assert_eq!(
            binding.to_string(),
            "bindBuffer: argument 1: expected WebGLBuffer, found number"
        );
    }
}
