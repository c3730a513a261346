//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `callbacks`: Callback query handling for review card buttons
//! - `commands`: Parsing of the slash commands the bot understands
//! - `command_handlers`: Static replies for /start, /help and /id
//! - `message_handler`: Handles incoming text, command and photo messages
//! - `dialogue_manager`: The publicise conversation state machine
//! - `telegram_messenger`: Bot API implementation of the outbound messenger
//! - `ui_builder`: Review cards, keyboards and decision annotations

pub mod callbacks;
pub mod command_handlers;
pub mod commands;
pub mod dialogue_manager;
pub mod message_handler;
pub mod telegram_messenger;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callbacks::callback_handler::callback_handler;
pub use message_handler::message_handler;

pub use dialogue_manager::{EventOrigin, InboundEvent, PhotoPayload, PubliciseFlow, SKIP_TOKEN};
pub use telegram_messenger::TelegramMessenger;
