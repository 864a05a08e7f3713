//! Widget configuration.
//!
//! # Responsibility
//! - Carry per-surface defaults for newly created notes.
//! - Parse and validate JSON config files.
//!
//! # Invariants
//! - A validated config has non-zero default width and height.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Default note width in pixels.
pub const DEFAULT_NOTE_WIDTH: u32 = 200;
/// Default note height in pixels.
pub const DEFAULT_NOTE_HEIGHT: u32 = 100;
/// Default note body.
pub const DEFAULT_NOTE_TEXT: &str = "Enter a note.";

/// Defaults applied to notes created by a user gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetConfig {
    pub width: u32,
    pub height: u32,
    pub text: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_NOTE_WIDTH,
            height: DEFAULT_NOTE_HEIGHT,
            text: DEFAULT_NOTE_TEXT.to_string(),
        }
    }
}

impl WidgetConfig {
    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroDimension("width"));
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroDimension("height"));
        }
        Ok(())
    }
}

/// Config load/validation failures.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    ZeroDimension(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::ZeroDimension(field) => write!(f, "config `{field}` must be greater than 0"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::ZeroDimension(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, WidgetConfig, DEFAULT_NOTE_HEIGHT, DEFAULT_NOTE_TEXT};

    #[test]
    fn missing_fields_take_defaults() {
        let config = WidgetConfig::from_json_str(r#"{"width": 240}"#).expect("valid config");
        assert_eq!(config.width, 240);
        assert_eq!(config.height, DEFAULT_NOTE_HEIGHT);
        assert_eq!(config.text, DEFAULT_NOTE_TEXT);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let err = WidgetConfig::from_json_str(r#"{"height": 0}"#).expect_err("zero height");
        assert!(matches!(err, ConfigError::ZeroDimension("height")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = WidgetConfig::from_json_str(r#"{"colour": "red"}"#).expect_err("unknown field");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("widget.json");
        std::fs::write(&path, r#"{"text": "todo"}"#).expect("write config");
        let config = WidgetConfig::load(&path).expect("load config");
        assert_eq!(config.text, "todo");
    }
}
