//! Configuration system
//!
//! Engine settings load from TOML or RON, chosen by file extension. Every
//! field has a default so partial files are valid.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Frame timing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Fixed simulation step in seconds (50 Hz by default)
    pub fixed_delta_time: f32,
    /// Largest raw frame duration honoured per frame
    pub max_delta_time: f32,
    /// Multiplier applied to every frame delta
    pub time_scale: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            fixed_delta_time: 0.02,
            max_delta_time: 0.1,
            time_scale: 1.0,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Application title, used for logging
    pub title: String,
    /// Logical screen size handed to new scenes
    pub screen_size: (u32, u32),
    /// Background color handed to new scenes
    pub background_color: (u8, u8, u8),
    /// Start new scenes in editor mode (simulation hooks disabled)
    pub editor_mode: bool,
    /// Directory used by [`crate::Engine::save_scene`] and [`crate::Engine::load_scene`]
    pub scenes_path: String,
    /// Frame timing
    pub time: TimeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Scene Engine".to_string(),
            screen_size: (800, 600),
            background_color: (0, 0, 0),
            editor_mode: false,
            scenes_path: "scenes".to_string(),
            time: TimeConfig::default(),
        }
    }
}

impl Config for EngineConfig {}
