//! Error types for startup and rendering failures.
//!
//! The viewport core has no error paths of its own; everything here comes
//! from platform setup (window, GL) or from loading the config file. These
//! are fatal: they are reported once and the event loop exits.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create {kind}: {message}")]
    Create { kind: &'static str, message: String },
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: &'static str, log: String },
    #[error("shader program failed to link: {0}")]
    Link(String),
    #[error("uniform {0} not found in program")]
    MissingUniform(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("OpenGL context error: {0}")]
    Gl(#[from] glutin::error::Error),
    #[error("window has zero size")]
    ZeroSize,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
