//! Configuration error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("XDG directory error: {0}")]
    XdgError(String),

    #[error("Failed to render configuration as TOML: {0}")]
    RenderError(#[from] toml::ser::Error),
}
