//! Command Handlers module for the static bot commands

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::localization::LocalizationManager;

/// Handle the /start command
pub async fn handle_start_command(
    bot: &Bot,
    msg: &Message,
    localization: &Arc<LocalizationManager>,
    language_code: Option<&str>,
) -> Result<()> {
    let me = bot.get_me().await?;
    let user_name = msg
        .from
        .as_ref()
        .map(|user| user.first_name.clone())
        .unwrap_or_default();

    let greeting = localization.t_args(
        "start-greeting",
        &[("user", user_name.as_str()), ("bot", me.user.first_name.as_str())],
        language_code,
    );
    bot.send_message(msg.chat.id, greeting).await?;
    Ok(())
}

/// Handle the /help command; the full list is only sent in private chats
pub async fn handle_help_command(
    bot: &Bot,
    msg: &Message,
    localization: &Arc<LocalizationManager>,
    language_code: Option<&str>,
) -> Result<()> {
    let key = if msg.chat.is_private() {
        "help-private"
    } else {
        "help-group"
    };
    bot.send_message(msg.chat.id, localization.t(key, language_code))
        .await?;
    Ok(())
}

/// Handle the /id command
pub async fn handle_id_command(
    bot: &Bot,
    msg: &Message,
    localization: &Arc<LocalizationManager>,
    language_code: Option<&str>,
) -> Result<()> {
    debug!(chat_id = %msg.chat.id, "Handling /id command");

    let chat_id = msg.chat.id.to_string();
    let user_id = msg
        .from
        .as_ref()
        .map(|user| user.id.to_string())
        .unwrap_or_default();

    let reply = localization.t_args(
        "id-reply",
        &[("chat_id", chat_id.as_str()), ("user_id", user_id.as_str())],
        language_code,
    );
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}
