//! Error handling module for reelcut startup and wiring

use thiserror::Error;

/// Errors raised while configuring and starting the service
#[derive(Error, Debug)]
pub enum ReelcutError {
    /// Configured encoder or probe binary could not be resolved
    #[error("Encoder not found: {configured} ({reason})")]
    EncoderNotFound { configured: String, reason: String },

    /// Explicitly requested configuration file does not exist
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration file is not valid TOML for the settings schema
    #[error("Failed to parse configuration file {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Settings failed validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Logging subscriber could not be installed
    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },

    /// In-process libav could not be initialized
    #[error("Failed to initialize libav: {message}")]
    LibavInit { message: String },

    /// HTTP server failed to bind or run
    #[error("Server error: {message}")]
    Server { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReelcutError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        ReelcutError::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result type alias for reelcut operations
pub type ReelcutResult<T> = std::result::Result<T, ReelcutError>;
