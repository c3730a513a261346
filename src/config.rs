//! # Unified Application Configuration
//!
//! Consolidates the bot, destination and observability settings into a
//! single structure loaded from environment variables and validated once at
//! startup.

use crate::errors::{AppError, AppResult};
use crate::observability_config::ObservabilityConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use teloxide::types::UserId;

/// Bot-specific configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Telegram bot token
    pub token: String,
    /// HTTP client timeout in seconds
    pub http_timeout_secs: u64,
    /// Only this user may drive the photo and text steps of the flow
    pub owner_id: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            http_timeout_secs: 30,
            owner_id: None,
        }
    }
}

impl BotConfig {
    pub fn owner(&self) -> Option<UserId> {
        self.owner_id.map(UserId)
    }

    /// Validate bot configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.token.trim().is_empty() {
            return Err(AppError::Config("Bot token cannot be empty".to_string()));
        }

        // Telegram bot tokens look like "<numeric bot id>:<secret>"
        let parts: Vec<&str> = self.token.split(':').collect();
        if parts.len() != 2 {
            return Err(AppError::Config(
                "Bot token format is invalid. Expected format: 'bot_id:bot_token'".to_string(),
            ));
        }

        if parts[0].parse::<u64>().is_err() {
            return Err(AppError::Config(
                "Bot token bot ID must be numeric".to_string(),
            ));
        }

        if parts[1].len() < 20 {
            return Err(AppError::Config(
                "Bot token appears to be too short. Please verify it's a valid token".to_string(),
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(AppError::Config("HTTP timeout cannot be 0".to_string()));
        }

        if self.http_timeout_secs > 300 {
            return Err(AppError::Config(
                "HTTP timeout cannot be greater than 300 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

/// Where the destination chat list lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub chat_list_path: PathBuf,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            chat_list_path: PathBuf::from("chat_list.json"),
        }
    }
}

impl DestinationConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.chat_list_path.as_os_str().is_empty() {
            return Err(AppError::Config(
                "CHAT_LIST_PATH cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub destinations: DestinationConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let token = lookup("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            AppError::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required but not set".to_string(),
            )
        })?;

        let http_timeout_secs = match lookup("HTTP_CLIENT_TIMEOUT_SECS") {
            Some(value) => value.parse::<u64>().map_err(|_| {
                AppError::Config(
                    "HTTP_CLIENT_TIMEOUT_SECS must be a valid number of seconds".to_string(),
                )
            })?,
            None => BotConfig::default().http_timeout_secs,
        };

        let owner_id = match lookup("OWNER_ID") {
            Some(value) if !value.trim().is_empty() => {
                Some(value.trim().parse::<u64>().map_err(|_| {
                    AppError::Config("OWNER_ID must be a numeric Telegram user ID".to_string())
                })?)
            }
            _ => None,
        };

        let destinations = match lookup("CHAT_LIST_PATH") {
            Some(path) => DestinationConfig {
                chat_list_path: PathBuf::from(path),
            },
            None => DestinationConfig::default(),
        };

        Ok(Self {
            bot: BotConfig {
                token,
                http_timeout_secs,
                owner_id,
            },
            destinations,
            observability: ObservabilityConfig::from_lookup(&lookup),
        })
    }

    /// Validate the complete configuration
    pub fn validate(&self) -> AppResult<()> {
        self.bot.validate()?;
        self.destinations.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TOKEN: &str = "123456789:ABCdefGhIJKlmNoPQRsTUVwxyZ123456";

    #[test]
    fn test_bot_config_validation() {
        let config = BotConfig {
            token: VALID_TOKEN.to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        for token in ["", "no-colon", "abc:ABCdefGhIJKlmNoPQRsTUVwxyZ", "1:short", "1:2:3"] {
            let config = BotConfig {
                token: token.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "token {:?} should be rejected", token);
        }
    }

    #[test]
    fn test_http_timeout_bounds() {
        let config = BotConfig {
            token: VALID_TOKEN.to_string(),
            http_timeout_secs: 301,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_owner_accessor() {
        let config = BotConfig {
            owner_id: Some(77),
            ..Default::default()
        };
        assert_eq!(config.owner(), Some(UserId(77)));
    }
}
