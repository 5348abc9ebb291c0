//! Common error types for AgriTrack

use thiserror::Error;

/// Common result type for AgriTrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across AgriTrack crates
#[derive(Error, Debug)]
pub enum Error {
    /// Record input rejected before it reached the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

impl Error {
    /// True for errors the user can fix by changing their input
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// True when the targeted record no longer exists
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
