//! Error types
//!
//! Startup and transport failures. Per-request decisions (path resolution,
//! precondition evaluation) never produce these; they return plain values.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),

    #[error("static file directory does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("static file root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
