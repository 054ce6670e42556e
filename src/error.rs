//! Error types for rusty_oxr

use thiserror::Error;

/// Main error type for rusty_oxr
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Remote service returned HTTP {status}: {body}")]
    RemoteService { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExchangeError {
    /// HTTP status of a remote failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ExchangeError::RemoteService { status, .. } => Some(*status),
            ExchangeError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for rusty_oxr operations
pub type Result<T> = std::result::Result<T, ExchangeError>;
