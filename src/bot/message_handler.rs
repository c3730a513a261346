//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::localization::LocalizationManager;
use crate::observability;

use super::command_handlers::{handle_help_command, handle_id_command, handle_start_command};
use super::commands::Command;
use super::dialogue_manager::{EventOrigin, InboundEvent, PubliciseFlow};

/// Entry point for every message update
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    flow: Arc<PubliciseFlow>,
    localization: Arc<LocalizationManager>,
    bot_username: Arc<String>,
) -> Result<()> {
    let span = observability::telegram_span("message_handler", msg.from.as_ref().map(|u| u.id.0));
    let _enter = span.enter();

    let Some(user) = msg.from.as_ref() else {
        debug!(chat_id = %msg.chat.id, "Message without sender ignored");
        return Ok(());
    };

    let origin = EventOrigin {
        user_id: user.id,
        chat_id: msg.chat.id,
        private_chat: msg.chat.is_private(),
        language_code: user.language_code.clone(),
    };
    let language_code = origin.language_code.as_deref();

    if let Some(text) = msg.text() {
        if let Some(command) = Command::parse(text, Some(bot_username.as_str())) {
            observability::record_telegram_update("command");
            return match command {
                Command::Start => {
                    handle_start_command(&bot, &msg, &localization, language_code).await
                }
                Command::Help => handle_help_command(&bot, &msg, &localization, language_code).await,
                Command::Id => handle_id_command(&bot, &msg, &localization, language_code).await,
                Command::Publicise => Ok(flow.handle(InboundEvent::CommandPublicise(origin)).await?),
                Command::Feedback(reason) => {
                    Ok(flow
                        .handle(InboundEvent::CommandFeedback { origin, reason })
                        .await?)
                }
            };
        }

        if text.trim_start().starts_with('/') {
            observability::record_telegram_update("foreign_command");
            debug!(user_id = %user.id, "Unknown or foreign command ignored");
            return Ok(());
        }

        observability::record_telegram_update("text");
        return Ok(flow
            .handle(InboundEvent::TextOrSkip {
                origin,
                text: text.to_string(),
            })
            .await?);
    }

    if let Some(largest_photo) = msg.photo().and_then(|photos| photos.last()) {
        observability::record_telegram_update("photo");
        return Ok(flow
            .handle(InboundEvent::Photo {
                origin,
                photo: largest_photo.file.id.clone(),
            })
            .await?);
    }

    observability::record_telegram_update("unsupported");
    debug!(user_id = %user.id, "Unsupported message type ignored");
    Ok(())
}
