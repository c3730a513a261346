//! Destination lookup for review posts.
//!
//! The chat list is an externally maintained JSON document:
//!
//! ```json
//! [{ "source": -100123, "destination": [-100456] }]
//! ```
//!
//! Only the first entry's destination is used. The file is read on every
//! lookup so edits take effect without a restart.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use teloxide::types::ChatId;

use crate::errors::{AppError, AppResult};

/// Read-only source of the chat that receives review posts
pub trait DestinationProvider: Send + Sync {
    fn current_destination(&self) -> AppResult<ChatId>;
}

#[derive(Debug, Deserialize)]
struct ChatListEntry {
    destination: DestinationField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DestinationField {
    Single(i64),
    Many(Vec<i64>),
}

/// Parse a chat list document and return the first destination
pub fn parse_destination(json: &str) -> AppResult<ChatId> {
    let entries: Vec<ChatListEntry> = serde_json::from_str(json)
        .map_err(|e| AppError::Config(format!("Invalid chat list: {}", e)))?;

    let first = entries
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Config("Chat list is empty".to_string()))?;

    match first.destination {
        DestinationField::Single(id) => Ok(ChatId(id)),
        DestinationField::Many(ids) => ids
            .first()
            .map(|id| ChatId(*id))
            .ok_or_else(|| {
                AppError::Config("First chat list entry has no destination".to_string())
            }),
    }
}

/// Chat list stored as a JSON file on disk
#[derive(Debug, Clone)]
pub struct ChatListFile {
    path: PathBuf,
}

impl ChatListFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DestinationProvider for ChatListFile {
    fn current_destination(&self) -> AppResult<ChatId> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            AppError::Config(format!(
                "Cannot read chat list {}: {}",
                self.path.display(),
                e
            ))
        })?;
        parse_destination(&content)
    }
}

/// Fixed destination, useful when the chat list is managed elsewhere
#[derive(Debug, Clone, Copy)]
pub struct StaticDestination(pub ChatId);

impl DestinationProvider for StaticDestination {
    fn current_destination(&self) -> AppResult<ChatId> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_entry_wins() {
        let json = r#"[
            {"source": -1001, "destination": [-2001, -2002]},
            {"source": -1002, "destination": [-3001]}
        ]"#;
        assert_eq!(parse_destination(json).unwrap(), ChatId(-2001));
    }

    #[test]
    fn test_scalar_destination() {
        assert_eq!(
            parse_destination(r#"[{"destination": -42}]"#).unwrap(),
            ChatId(-42)
        );
    }

    #[test]
    fn test_invalid_chat_lists() {
        assert!(matches!(parse_destination("[]"), Err(AppError::Config(_))));
        assert!(matches!(
            parse_destination(r#"[{"destination": []}]"#),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            parse_destination(r#"[{"source": 1}]"#),
            Err(AppError::Config(_))
        ));
        assert!(matches!(parse_destination("{"), Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let provider = ChatListFile::new("/nonexistent/chat_list.json");
        assert!(matches!(
            provider.current_destination(),
            Err(AppError::Config(_))
        ));
    }
}
