//! Logging setup for hosts embedding the bindings.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! host's call. Validation failures log at `debug`, object lifecycle at
//! `debug`, per-call dispatch at `trace`.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for structured logging.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    /// Include source file location.
    pub include_location: bool,
    /// Custom filter string (e.g., "webgl_core=debug").
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            include_location: false,
            filter: None,
        }
    }
}

impl LogConfig {
    /// Validation failures and object lifecycle.
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            include_location: true,
            ..Default::default()
        }
    }

    /// Every dispatched call.
    pub fn trace() -> Self {
        Self {
            level: Level::TRACE,
            include_location: true,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn env_filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(self.level.to_string());
        match &self.filter {
            Some(custom) => EnvFilter::try_new(custom).unwrap_or_else(|_| fallback()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()),
        }
    }
}

/// Install a global subscriber. Returns `false` if one was already set.
pub fn init_logging(config: LogConfig) -> bool {
    let filter = config.env_filter();
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(true))
            .try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(!config.include_location);
    }

    #[test]
    fn test_log_config_debug() {
        let config = LogConfig::debug();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.include_location);
    }

    #[test]
    fn test_log_config_with_filter() {
        let config = LogConfig::default().with_filter("webgl_core=debug");
        assert_eq!(config.filter, Some("webgl_core=debug".to_string()));
    }

    #[test]
    fn test_second_init_reports_failure() {
        init_logging(LogConfig::trace());
        assert!(!init_logging(LogConfig::default()));
    }
}
