//! Shader translation hook.
//!
//! `compileShader` never hands script-supplied GLSL to the driver directly:
//! the source first goes through a [`ShaderTranslator`], and only a valid
//! translation reaches `shader_source`/`compile_shader`.

/// Result of translating one shader source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Source to forward to the driver.
    pub source: String,
    pub valid: bool,
    /// Reported by `getShaderInfoLog` when the source is rejected.
    pub log: String,
}

impl Translation {
    pub fn accepted(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            valid: true,
            log: String::new(),
        }
    }

    pub fn rejected(log: impl Into<String>) -> Self {
        Self {
            source: String::new(),
            valid: false,
            log: log.into(),
        }
    }
}

pub trait ShaderTranslator {
    fn translate(&self, source: &str, shader_type: u32) -> Translation;
}

/// Accepts every source unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

impl ShaderTranslator for PassthroughTranslator {
    fn translate(&self, source: &str, _shader_type: u32) -> Translation {
        Translation::accepted(source)
    }
}

impl<F> ShaderTranslator for F
where
    F: Fn(&str, u32) -> Translation,
{
    fn translate(&self, source: &str, shader_type: u32) -> Translation {
        self(source, shader_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FRAGMENT_SHADER, VERTEX_SHADER};

    #[test]
    fn test_passthrough_keeps_source() {
        let translation = PassthroughTranslator.translate("void main() {}", VERTEX_SHADER);
        assert!(translation.valid);
        assert_eq!(translation.source, "void main() {}");
        assert!(translation.log.is_empty());
    }

    #[test]
    fn test_closure_translator() {
        let reject_fragments = |source: &str, shader_type: u32| {
            if shader_type == FRAGMENT_SHADER {
                Translation::rejected("fragment shaders disabled")
            } else {
                Translation::accepted(format!("#version 100\n{}", source))
            }
        };

        let vertex = reject_fragments.translate("x", VERTEX_SHADER);
        assert_eq!(vertex.source, "#version 100\nx");
        let fragment = reject_fragments.translate("x", FRAGMENT_SHADER);
        assert!(!fragment.valid);
        assert_eq!(fragment.log, "fragment shaders disabled");
    }
}
