//! Viewer configuration
//!
//! One serializable settings struct for the whole viewer, loadable from
//! TOML or RON keyed on the file extension. Settings are validated
//! explicitly so a bad file is rejected before anything is built from it.

use serde::{Deserialize, Serialize};

/// Configuration trait
///
/// Types get file loading and saving for free; the format is chosen by
/// the path extension.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

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
            ron::ser::to_string_pretty(self, Default::default())
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

/// Settings for the planning viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Log level for the viewer
    pub log_level: String,
    /// Target FPS used to pace the frame loop
    pub target_fps: u32,
    /// Background clear color as RGBA in `[0, 1]`
    pub background_color: [f32; 4],
    /// Default duration of screen transitions in seconds
    pub transition_seconds: f32,
}

impl ViewerConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            target_fps: 60,
            background_color: [0.08, 0.09, 0.11, 1.0],
            transition_seconds: 0.4,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set target FPS
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Set the background clear color
    pub fn with_background_color(mut self, color: [f32; 4]) -> Self {
        self.background_color = color;
        self
    }

    /// Set the default screen transition duration
    pub fn with_transition_seconds(mut self, seconds: f32) -> Self {
        self.transition_seconds = seconds;
        self
    }

    /// Time budget of one frame at the target FPS
    pub fn frame_budget(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(1.0 / self.target_fps as f32)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.as_str()) {
            return Err(format!("Unknown log level '{}'", self.log_level));
        }

        if self.target_fps == 0 {
            return Err("Target FPS must be at least 1".to_string());
        }

        if self
            .background_color
            .iter()
            .any(|channel| !(0.0..=1.0).contains(channel))
        {
            return Err("Background color channels must be within [0, 1]".to_string());
        }

        if !self.transition_seconds.is_finite() || self.transition_seconds < 0.0 {
            return Err("Transition duration must be a non-negative number".to_string());
        }

        Ok(())
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for ViewerConfig {}
