// src/error.rs

//! Unified error handling for the notifier.

use std::fmt;

use thiserror::Error;

/// Result type alias for notifier operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Leaderboard endpoint answered with a non-2xx status
    #[error("Leaderboard API returned HTTP {status}")]
    BadStatus { status: u16 },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Leaderboard payload did not match the expected shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single notification channel rejected the message
    #[error("Delivery to {channel} failed: {message}")]
    Delivery { channel: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a delivery error for a channel.
    pub fn delivery(channel: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Delivery {
            channel: channel.into(),
            message: message.to_string(),
        }
    }

    /// Whether the leaderboard could not be fetched at all.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::BadStatus { .. } | Self::Http(_))
    }

    /// Whether the fetched payload was rejected by the schema check.
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
