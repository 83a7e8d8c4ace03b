//! Typed session configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    Position, Size, WindowLimits, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, MENU_BAR_HEIGHT,
    MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// What happens to windows that still belong to a desktop when it is deleted.
pub enum DesktopDeletionPolicy {
    /// Reassign them to the desktop that is current after the deletion.
    #[default]
    Migrate,
    /// Close them.
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Session manager settings. Every field is optional in the TOML source.
pub struct SessionConfig {
    /// Height of the menu bar; windows never move above it.
    pub menu_bar_height: i32,
    /// Minimum window width.
    pub min_window_width: i32,
    /// Minimum window height.
    pub min_window_height: i32,
    /// Width of newly opened windows without explicit geometry.
    pub default_window_width: i32,
    /// Height of newly opened windows without explicit geometry.
    pub default_window_height: i32,
    /// Top-left of the first cascaded window.
    pub cascade_origin: Position,
    /// Offset between consecutive cascaded windows.
    pub cascade_step: i32,
    /// Number of cascade positions before wrapping back to the origin.
    pub cascade_slots: u32,
    /// Initial viewport size until the host reports the real one.
    pub viewport: Size,
    /// Initial dark-mode flag.
    pub dark_mode: bool,
    /// Fate of windows on a deleted desktop.
    pub desktop_deletion: DesktopDeletionPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            menu_bar_height: MENU_BAR_HEIGHT,
            min_window_width: MIN_WINDOW_WIDTH,
            min_window_height: MIN_WINDOW_HEIGHT,
            default_window_width: DEFAULT_WINDOW_WIDTH,
            default_window_height: DEFAULT_WINDOW_HEIGHT,
            cascade_origin: Position { x: 80, y: 64 },
            cascade_step: 24,
            cascade_slots: 8,
            viewport: Size {
                width: 1280,
                height: 800,
            },
            dark_mode: false,
            desktop_deletion: DesktopDeletionPolicy::Migrate,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors raised while loading a [`SessionConfig`].
pub enum ConfigError {
    /// The TOML source could not be deserialized.
    #[error("failed to parse session config: {0}")]
    Parse(String),
    /// The config deserialized but violates a constraint.
    #[error("invalid session config: {0}")]
    Invalid(String),
}

impl SessionConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and [`ConfigError::Invalid`] when a value
    /// is out of range.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.menu_bar_height < 0 {
            return Err(ConfigError::Invalid(
                "menu_bar_height must not be negative".to_string(),
            ));
        }
        if self.min_window_width <= 0 || self.min_window_height <= 0 {
            return Err(ConfigError::Invalid(
                "minimum window size must be positive".to_string(),
            ));
        }
        if self.cascade_slots == 0 {
            return Err(ConfigError::Invalid(
                "cascade_slots must be at least 1".to_string(),
            ));
        }
        if self.viewport.width <= 0 || self.viewport.height <= 0 {
            return Err(ConfigError::Invalid("viewport must be non-empty".to_string()));
        }
        Ok(())
    }

    /// Geometry limits derived from this config.
    pub fn limits(&self) -> WindowLimits {
        WindowLimits {
            menu_bar_height: self.menu_bar_height,
            min_width: self.min_window_width,
            min_height: self.min_window_height,
        }
    }
}
