//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::MaybeInaccessibleMessage;
use teloxide::utils::render::RenderMessageTextHelper;
use tracing::{debug, warn};

use crate::observability;
use crate::review::ReviewRef;

use crate::bot::dialogue_manager::{EventOrigin, InboundEvent, PubliciseFlow};

/// Handle callback queries from review card keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    flow: Arc<PubliciseFlow>,
) -> Result<()> {
    let span = observability::telegram_span("callback_handler", Some(q.from.id.0));
    let _enter = span.enter();
    observability::record_telegram_update("callback");

    // Always answer so the client stops showing the loading indicator
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
    }

    let msg = match &q.message {
        Some(MaybeInaccessibleMessage::Regular(msg)) => msg,
        _ => {
            debug!(user_id = %q.from.id, "Callback without an accessible message ignored");
            return Ok(());
        }
    };

    let token = q.data.clone().unwrap_or_default();
    let review = ReviewRef {
        chat_id: msg.chat.id,
        message_id: msg.id,
        has_photo: msg.photo().is_some(),
    };
    // Rendered from the message entities so the card keeps its formatting
    let current_html = msg
        .html_text()
        .or_else(|| msg.html_caption())
        .unwrap_or_default();

    let origin = EventOrigin {
        user_id: q.from.id,
        chat_id: msg.chat.id,
        private_chat: msg.chat.is_private(),
        language_code: q.from.language_code.clone(),
    };

    debug!(user_id = %q.from.id, token = %token, "Review control activated");
    flow.handle(InboundEvent::ControlActivated {
        origin,
        token,
        review,
        current_html,
    })
    .await?;

    Ok(())
}
