//! Viewer configuration.
//!
//! Loaded from a JSON file; any field left out falls back to the values in
//! `constants`. Lookup order: the path given as the first CLI argument, then
//! `mandelbrot.json` in the working directory, then built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_width: u32,
    pub window_height: u32,
    /// Start in borderless fullscreen
    pub fullscreen: bool,
    /// Escape-time iteration cap
    pub max_iterations: u32,
    /// Visible plane height at zoom 1.0
    pub vertical_span: f64,
    /// Resolution divisor for pan sensitivity
    pub translation_divisor: f64,
    /// Plane point shown at the window center at zoom 1.0
    pub initial_center: [f64; 2],
    pub wheel_zoom_step: f64,
    pub key_zoom_step: f64,
    pub show_hud: bool,
    /// Serve puffin profiling data over HTTP
    pub profiling: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: WINDOW_DEFAULT_WIDTH,
            window_height: WINDOW_DEFAULT_HEIGHT,
            fullscreen: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            vertical_span: VIEW_VERTICAL_SPAN,
            translation_divisor: TRANSLATION_DIVISOR,
            initial_center: INITIAL_CENTER,
            wheel_zoom_step: WHEEL_ZOOM_STEP,
            key_zoom_step: KEY_ZOOM_STEP,
            show_hud: true,
            profiling: false,
        }
    }
}

impl ViewerConfig {
    /// Resolve the config from an optional explicit path.
    ///
    /// An explicit path must load. The default path is only used if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            tracing::debug!("no config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the viewport invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("vertical_span", self.vertical_span)?;
        positive("translation_divisor", self.translation_divisor)?;
        positive("wheel_zoom_step", self.wheel_zoom_step)?;
        positive("key_zoom_step", self.key_zoom_step)?;
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "max_iterations",
                reason: "must be at least 1".into(),
            });
        }
        if !self.initial_center.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "initial_center",
                reason: "must be finite".into(),
            });
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::Invalid {
                field: "window_width/window_height",
                reason: "must be non-zero".into(),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number, got {value}"),
        })
    }
}
