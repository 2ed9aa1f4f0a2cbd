//! Context configuration.

/// Drawing-buffer attributes reported by `getContextAttributes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextAttributes {
    pub alpha: bool,
    pub depth: bool,
    pub stencil: bool,
    pub antialias: bool,
    pub premultiplied_alpha: bool,
    pub preserve_drawing_buffer: bool,
}

impl Default for ContextAttributes {
    fn default() -> Self {
        Self {
            alpha: true,
            depth: true,
            stencil: false,
            antialias: true,
            premultiplied_alpha: true,
            preserve_drawing_buffer: false,
        }
    }
}

/// Configuration for a rendering context.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Reported for `getParameter(VENDOR)`.
    pub vendor: String,
    /// Reported for `getParameter(RENDERER)`.
    pub renderer: String,
    pub attributes: ContextAttributes,
    /// Maximum native errors read per `getError`.
    pub error_drain_limit: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            vendor: "webgl-core".to_string(),
            renderer: "webgl-core".to_string(),
            attributes: ContextAttributes::default(),
            error_drain_limit: 32,
        }
    }
}

impl ContextConfig {
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = renderer.into();
        self
    }

    pub fn with_attributes(mut self, attributes: ContextAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// At least one native read always happens.
    pub fn with_error_drain_limit(mut self, limit: usize) -> Self {
        self.error_drain_limit = limit.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ContextConfig::default();
        assert_eq!(config.renderer, "webgl-core");
        assert!(config.attributes.antialias);
        assert!(!config.attributes.stencil);
        assert_eq!(config.error_drain_limit, 32);
    }

    #[test]
    fn test_config_builders() {
        let config = ContextConfig::default()
            .with_vendor("acme")
            .with_renderer("acme-gl")
            .with_error_drain_limit(0);
        assert_eq!(config.vendor, "acme");
        assert_eq!(config.renderer, "acme-gl");
        assert_eq!(config.error_drain_limit, 1);
    }
}
