// src/error.rs
// Error types for the widget engine

use thiserror::Error;

/// Main error type for the widget engine
#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("no public key provided")]
    MissingIdentity,

    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    #[error("session storage error: {0}")]
    Persistence(String),

    #[error("tracking failed: {0}")]
    Reporting(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Convenience type alias for Result using WidgetError
pub type Result<T> = std::result::Result<T, WidgetError>;

impl WidgetError {
    pub fn config_load(msg: impl Into<String>) -> Self {
        Self::ConfigLoad(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}
