//! Board configuration.

use crate::export::GridStyle;
use crate::shapes::SerializableColor;
use crate::tools::ToolSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Whiteboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteboardConfig {
    /// Canvas width in logical pixels.
    pub width: f64,
    /// Canvas height in logical pixels.
    pub height: f64,
    pub background: SerializableColor,
    pub show_grid: bool,
    pub grid: GridStyle,
    /// Tool, color and stroke width in effect at startup.
    pub tool: ToolSettings,
    /// Content given to freshly placed text elements.
    pub text_placeholder: String,
    /// Uploaded images are shrunk to fit this fraction of the canvas.
    pub image_fit_ratio: f64,
    /// Pixel ratio used for page exports and thumbnails.
    pub export_pixel_ratio: f64,
    /// New pages are named "<prefix> <n>".
    pub page_name_prefix: String,
    /// Appended to the name of a duplicated page.
    pub duplicate_suffix: String,
    /// Maximum number of history snapshots per page; unlimited when absent.
    /// Once exceeded the oldest snapshots are dropped, so undo can no longer
    /// reach the page's state from before its first edit.
    pub history_limit: Option<usize>,
}

impl Default for WhiteboardConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            background: SerializableColor::white(),
            show_grid: true,
            grid: GridStyle::default(),
            tool: ToolSettings::default(),
            text_placeholder: "Click to edit text".to_string(),
            image_fit_ratio: 0.8,
            export_pixel_ratio: 2.0,
            page_name_prefix: "Page".to_string(),
            duplicate_suffix: " (copy)".to_string(),
            history_limit: None,
        }
    }
}

impl WhiteboardConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        };
        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("export_pixel_ratio", self.export_pixel_ratio)?;
        positive("grid.spacing", self.grid.spacing)?;
        if !(self.image_fit_ratio > 0.0 && self.image_fit_ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "image_fit_ratio must be in (0, 1], got {}",
                self.image_fit_ratio
            )));
        }
        if !(self.tool.stroke_width.is_finite() && self.tool.stroke_width >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tool.stroke_width must not be negative, got {}",
                self.tool.stroke_width
            )));
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid("history_limit must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Name for the `n`th page (1-based).
    pub fn page_name(&self, n: usize) -> String {
        format!("{} {}", self.page_name_prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolKind;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = WhiteboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tool.tool, ToolKind::Pen);
        assert_eq!(config.page_name(2), "Page 2");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = WhiteboardConfig::from_json(r#"{"width": 800, "page_name_prefix": "Slide"}"#)
            .unwrap();
        assert_eq!(config.width, 800.0);
        assert_eq!(config.height, 720.0);
        assert_eq!(config.page_name(1), "Slide 1");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            WhiteboardConfig::from_json(r#"{"width": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            WhiteboardConfig::from_json(r#"{"image_fit_ratio": 1.5}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            WhiteboardConfig::from_json(r#"{"history_limit": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            WhiteboardConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"show_grid": false, "history_limit": 25}}"#).unwrap();
        let config = WhiteboardConfig::load(file.path()).unwrap();
        assert!(!config.show_grid);
        assert_eq!(config.history_limit, Some(25));
    }

    #[test]
    fn test_load_missing_file() {
        let err = WhiteboardConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
