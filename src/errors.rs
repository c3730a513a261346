//! # Application Error Types
//!
//! This module defines the error taxonomy shared by the publicise flow,
//! the markup translator and the Telegram plumbing around them.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Event does not match the recorded session state
    InvalidState(String),
    /// Markup translation or validation failure
    Format(String),
    /// A send or edit towards Telegram failed
    Delivery(String),
    /// Malformed review control token
    Decode(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::InvalidState(msg) => write!(f, "[STATE] {}", msg),
            AppError::Format(msg) => write!(f, "[FORMAT] {}", msg),
            AppError::Delivery(msg) => write!(f, "[DELIVERY] {}", msg),
            AppError::Decode(msg) => write!(f, "[DECODE] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<teloxide::RequestError> for AppError {
    fn from(err: teloxide::RequestError) -> Self {
        AppError::Delivery(err.to_string())
    }
}

impl From<crate::markup::FormatError> for AppError {
    fn from(err: crate::markup::FormatError) -> Self {
        AppError::Format(err.to_string())
    }
}

impl From<crate::review::DecodeError> for AppError {
    fn from(err: crate::review::DecodeError) -> Self {
        AppError::Decode(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::{error, warn};

    /// Log a failed send/edit towards a user, moderator or review chat
    pub fn log_delivery_error(
        error: &impl std::fmt::Display,
        operation: &str,
        user_id: Option<u64>,
        chat_id: Option<i64>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            user_id = ?user_id,
            chat_id = ?chat_id,
            "Delivery to Telegram failed"
        );
    }

    /// Log rejected user markup; the input is truncated to keep log lines bounded
    pub fn log_format_error(error: &impl std::fmt::Display, user_id: u64, input: &str) {
        let preview: String = input.chars().take(100).collect();
        warn!(
            error = %error,
            user_id = %user_id,
            input_length = input.len(),
            input_preview = %preview,
            "Markup validation failed"
        );
    }

    /// Log a review control token that could not be decoded
    pub fn log_decode_error(error: &impl std::fmt::Display, token: &str, moderator_id: u64) {
        warn!(
            error = %error,
            token = %token,
            moderator_id = %moderator_id,
            "Review control token could not be decoded"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}
