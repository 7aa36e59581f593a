//! Editor configuration.

use crate::handles::HANDLE_HIT_TOLERANCE;
use crate::storage::{DEFAULT_RECENT_CAPACITY, RECENT_COMPONENTS_KEY};
use crate::viewport::{DeviceMode, ZoomLevel};
use kurbo::{Point, Size};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Defaults and tunables for an editor session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub default_zoom: ZoomLevel,
    pub default_device: DeviceMode,
    /// Where fresh free-form drops land.
    pub drop_origin: Point,
    /// Frame size for kinds without a registered default.
    pub fallback_size: Size,
    /// Vertical gap between stacked components.
    pub stack_spacing: f64,
    /// Handle hit slop in screen pixels.
    pub handle_tolerance: f64,
    pub recent_capacity: usize,
    pub recent_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_zoom: ZoomLevel::DEFAULT,
            default_device: DeviceMode::Desktop,
            drop_origin: Point::new(50.0, 50.0),
            fallback_size: Size::new(300.0, 200.0),
            stack_spacing: 16.0,
            handle_tolerance: HANDLE_HIT_TOLERANCE,
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            recent_key: RECENT_COMPONENTS_KEY.to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
