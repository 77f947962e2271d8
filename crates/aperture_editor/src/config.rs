// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration, stored as RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for this config
    #[error("Config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The config could not be written as RON
    #[error("Config serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Camera editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Letterbox aspect ratio, `"1.85"` or `"16:9"`
    pub aspect_ratio: String,
    /// Draw letterbox bars
    pub letterbox: bool,
    /// Draw rule-of-thirds guides
    pub rule_of_thirds: bool,
    /// Show the camera position while syncing or playing
    pub display_position: bool,
    /// Move the camera to the scrubbed tick while editing
    pub sync: bool,
    /// Flight speed change per scroll notch
    pub flight_speed_step: f32,
    /// Field of view used when the host has none
    pub default_fov: f32,
    /// Attach the outside stand-in when the editor opens
    pub outside_on_open: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: "16:9".to_string(),
            letterbox: false,
            rule_of_thirds: false,
            display_position: false,
            sync: false,
            flight_speed_step: 0.1,
            default_fov: aperture_camera::pose::DEFAULT_FOV,
            outside_on_open: true,
        }
    }
}

impl EditorConfig {
    /// Parse config text
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    /// Render the config as pretty RON
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load config from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Load config from a file, falling back to defaults when it is missing
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No editor config, using defaults");
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}

/// Parse an aspect ratio written as a number or as `width:height`.
///
/// Returns `None` for anything that is not a positive finite ratio.
pub fn parse_aspect_ratio(text: &str) -> Option<f32> {
    let text = text.trim();
    let ratio = match text.parse::<f32>() {
        Ok(ratio) => ratio,
        Err(_) => {
            let (width, height) = text.split_once(':')?;
            width.trim().parse::<f32>().ok()? / height.trim().parse::<f32>().ok()?
        }
    };

    (ratio.is_finite() && ratio > 0.0).then_some(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aspect_ratio() {
        assert_eq!(parse_aspect_ratio("1.85"), Some(1.85));
        assert_eq!(parse_aspect_ratio("16:9"), Some(16.0 / 9.0));
        assert_eq!(parse_aspect_ratio(" 4 : 3 "), Some(4.0 / 3.0));
        assert_eq!(parse_aspect_ratio("16:0"), None);
        assert_eq!(parse_aspect_ratio("wide"), None);
        assert_eq!(parse_aspect_ratio("1:2:3"), None);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = EditorConfig::from_ron_str("(letterbox: true, aspect_ratio: \"2.39\")").unwrap();

        assert!(config.letterbox);
        assert_eq!(config.aspect_ratio, "2.39");
        assert_eq!(config.flight_speed_step, 0.1);
        assert!(config.outside_on_open);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = EditorConfig {
            sync: true,
            default_fov: 55.0,
            ..Default::default()
        };

        let text = config.to_ron_string().unwrap();
        assert_eq!(EditorConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("aperture_editor_missing_config.ron");
        let _ = std::fs::remove_file(&path);

        assert_eq!(EditorConfig::load_or_default(&path).unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_bad_file_is_a_parse_error() {
        assert!(matches!(EditorConfig::from_ron_str("(letterbox: 3)"), Err(ConfigError::Parse(_))));
    }
}
