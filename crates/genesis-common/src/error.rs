//! Error types for Project Genesis.

use thiserror::Error;

/// Top-level error type for Genesis operations.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl From<serde_json::Error> for GenesisError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<toml::ser::Error> for GenesisError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type alias for Genesis operations.
pub type GenesisResult<T> = Result<T, GenesisError>;
