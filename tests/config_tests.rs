//! # Configuration Tests
//!
//! Loads the application configuration from controlled variable sets and
//! reads chat lists from temporary files.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use teloxide::types::{ChatId, UserId};
use tempfile::NamedTempFile;

use publicity_forwarder::config::AppConfig;
use publicity_forwarder::destinations::{ChatListFile, DestinationProvider};
use publicity_forwarder::errors::AppError;

const VALID_TOKEN: &str = "123456789:ABCdefGhIJKlmNoPQRsTUVwxyZ123456";

fn load(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

fn chat_list(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write chat list");
    file
}

#[test]
fn test_defaults() {
    let config = load(&[("TELEGRAM_BOT_TOKEN", VALID_TOKEN)]).unwrap();

    assert_eq!(config.bot.http_timeout_secs, 30);
    assert_eq!(config.bot.owner(), None);
    assert_eq!(config.destinations.chat_list_path, Path::new("chat_list.json"));
    assert_eq!(config.observability.metrics_port, 9090);
    assert!(config.validate().is_ok());
}

#[test]
fn test_full_environment() {
    let config = load(&[
        ("TELEGRAM_BOT_TOKEN", VALID_TOKEN),
        ("OWNER_ID", "424242"),
        ("CHAT_LIST_PATH", "/etc/forwarder/chats.json"),
        ("HTTP_CLIENT_TIMEOUT_SECS", "60"),
        ("ENVIRONMENT", "production"),
        ("OBSERVABILITY_LOG_LEVEL", "debug"),
        ("ENABLE_METRICS_EXPORT", "false"),
    ])
    .unwrap();

    assert_eq!(config.bot.owner(), Some(UserId(424242)));
    assert_eq!(config.bot.http_timeout_secs, 60);
    assert_eq!(
        config.destinations.chat_list_path,
        Path::new("/etc/forwarder/chats.json")
    );
    assert!(!config.observability.is_development());
    assert!(!config.observability.use_pretty_logs());
    assert!(!config.observability.enable_metrics_export);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_token() {
    let err = load(&[]).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
    assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
}

#[test]
fn test_invalid_values() {
    assert!(load(&[("TELEGRAM_BOT_TOKEN", VALID_TOKEN), ("OWNER_ID", "me")]).is_err());
    assert!(load(&[
        ("TELEGRAM_BOT_TOKEN", VALID_TOKEN),
        ("HTTP_CLIENT_TIMEOUT_SECS", "soon")
    ])
    .is_err());

    let config = load(&[
        ("TELEGRAM_BOT_TOKEN", VALID_TOKEN),
        ("HTTP_CLIENT_TIMEOUT_SECS", "0"),
    ])
    .unwrap();
    assert!(config.validate().is_err());

    let config = load(&[
        ("TELEGRAM_BOT_TOKEN", VALID_TOKEN),
        ("OBSERVABILITY_LOG_LEVEL", "loud"),
    ])
    .unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_chat_list_file_destination() {
    let file = chat_list(r#"[{"source": -100111, "destination": [-100222, -100333]}]"#);
    let provider = ChatListFile::new(file.path());

    assert_eq!(provider.current_destination().unwrap(), ChatId(-100222));
}

#[test]
fn test_chat_list_is_reread_on_every_lookup() {
    let file = chat_list(r#"[{"destination": -100222}]"#);
    let provider = ChatListFile::new(file.path());
    assert_eq!(provider.current_destination().unwrap(), ChatId(-100222));

    std::fs::write(file.path(), r#"[{"destination": [-100999]}]"#).unwrap();
    assert_eq!(provider.current_destination().unwrap(), ChatId(-100999));
}

#[test]
fn test_chat_list_errors() {
    let missing = ChatListFile::new("/nonexistent/forwarder/chat_list.json");
    assert!(matches!(
        missing.current_destination(),
        Err(AppError::Config(_))
    ));

    for content in ["[]", "not json", r#"[{"destination": []}]"#] {
        let file = chat_list(content);
        let provider = ChatListFile::new(file.path());
        assert!(
            provider.current_destination().is_err(),
            "chat list {:?} should be rejected",
            content
        );
    }
}
