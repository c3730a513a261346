//! # Publicity Forwarder Telegram Bot
//!
//! A Telegram bot that lets users submit publicity messages, optionally with a
//! photo, written in a small bracket markup. Submissions are translated to
//! HTML and posted to a review chat where moderators accept or reject them.

pub mod bot;
pub mod config;
pub mod destinations;
pub mod dialogue;
pub mod errors;
pub mod localization;
pub mod markup;
pub mod observability;
pub mod observability_config;
pub mod review;

// Re-export types for easier access
pub use config::AppConfig;
pub use errors::{AppError, AppResult};
