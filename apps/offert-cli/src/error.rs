//! # CLI Error Types
//!
//! Typed errors for configuration. Command handlers wrap everything else in
//! `anyhow` with context.

use offert_core::ValidationError;
use thiserror::Error;

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A percentage failed the same checks the editor applies.
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// No platform config directory and no explicit path.
    #[error("No config path available; pass --config")]
    NoPath,

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
