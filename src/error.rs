//! Error types for Crosscast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrosscastError>;

#[derive(Error, Debug)]
pub enum CrosscastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl CrosscastError {
    /// Whether this error is a cancellation rejection.
    ///
    /// Callers use this to tell a fired cancellation signal apart from a
    /// genuine network or platform failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CrosscastError::Cancelled)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum PlatformError {
    /// A call-time argument was rejected before any network I/O.
    #[error("Content validation failed: {0}")]
    Validation(String),

    /// The platform returned a non-success HTTP response.
    #[error("Platform request failed: {status} {status_text}{}{}",
        .code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default(),
        .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Api {
        status: u16,
        status_text: String,
        /// Structured error code from the platform's error body.
        code: Option<String>,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(String),

    /// The handle-resolution backend is entirely unavailable.
    ///
    /// A single handle that fails to resolve is not an error at all; it is
    /// the `Resolution::Unresolved`/`Resolution::Failed` outcome and drops
    /// only that facet.
    #[error("Mention resolution unavailable: {0}")]
    Resolution(String),
}
