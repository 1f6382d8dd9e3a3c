//! Configuration for the Lift refactoring engine.
//!
//! Configuration lives in a TOML file with two tables:
//!
//! ```toml
//! [extract]
//! function_name = "newFunction"
//! indent_width = 4
//! use_tabs = false
//!
//! [logging]
//! level = "info"
//! json = false
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use std::path::Path;
use std::sync::Once;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiftConfig {
    pub extract: ExtractConfig,
    pub logging: LoggingConfig,
}

impl LiftConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: LiftConfig = toml::from_str(text)?;
        config.extract.validate()?;
        Ok(config)
    }
}

/// Options for synthesized functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Base name for extracted functions; a numeric suffix is appended on collision.
    pub function_name: String,
    /// Spaces per indentation level inside the new function body.
    pub indent_width: usize,
    pub use_tabs: bool,
}

impl ExtractConfig {
    pub const DEFAULT_FUNCTION_NAME: &'static str = "newFunction";

    /// One level of indentation.
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_width)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut chars = self.function_name.chars();
        let valid_name = chars
            .next()
            .is_some_and(|c| c == '_' || c == '$' || c.is_alphabetic())
            && chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric());
        if !valid_name {
            return Err(ConfigError::Invalid {
                key: "extract.function_name",
                message: format!("`{}` is not an identifier", self.function_name),
            });
        }
        if self.indent_width == 0 || self.indent_width > 16 {
            return Err(ConfigError::Invalid {
                key: "extract.indent_width",
                message: format!("expected 1..=16, got {}", self.indent_width),
            });
        }
        Ok(())
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            function_name: Self::DEFAULT_FUNCTION_NAME.to_string(),
            indent_width: 4,
            use_tabs: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    pub level: String,
    pub json: bool,
    /// Write to stderr; when `false` events are discarded.
    pub stderr: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// Effective filter: the configured level merged with `RUST_LOG`, if set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid value for `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // Keep the message without the source snippet.
        ConfigError::Toml(err.message().to_string())
    }
}

static TRACING_INIT: Once = Once::new();

/// Install the global `tracing` subscriber. Only the first call has an effect.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let layer: Box<dyn Layer<_> + Send + Sync> = match (config.stderr, config.json) {
            (false, _) => tracing_subscriber::fmt::layer()
                .with_writer(std::io::sink)
                .boxed(),
            (true, true) => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed(),
            (true, false) => tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed(),
        };

        if tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
            .is_err()
        {
            // Another subscriber was installed first (e.g. by an embedding host).
            return;
        }
        tracing::debug!(level = %config.level, json = config.json, "tracing initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_simple_levels() {
        assert_eq!(LoggingConfig::normalize_level_directives(" WARNING "), "warn");
        assert_eq!(LoggingConfig::normalize_level_directives(""), "info");
        assert_eq!(
            LoggingConfig::normalize_level_directives("lift_refactor=trace"),
            "lift_refactor=trace"
        );
    }

    #[test]
    fn indent_unit_honors_tabs() {
        let mut config = ExtractConfig::default();
        assert_eq!(config.indent_unit(), "    ");
        config.use_tabs = true;
        assert_eq!(config.indent_unit(), "\t");
    }

    #[test]
    fn rejects_non_identifier_function_names() {
        let config = ExtractConfig {
            function_name: "1st".into(),
            ..ExtractConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "extract.function_name",
                ..
            })
        ));
    }

    #[test]
    fn init_tracing_is_idempotent() {
        let config = LoggingConfig {
            stderr: false,
            ..LoggingConfig::default()
        };
        init_tracing(&config);
        init_tracing(&config);
    }
}
