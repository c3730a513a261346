//! Messenger implementation backed by the Telegram Bot API

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use tracing::debug;

use crate::errors::AppResult;
use crate::review::{Messenger, ReviewPost, ReviewRef};

use super::ui_builder::create_review_keyboard;

/// Sends notices and review cards through a teloxide [`Bot`]
#[derive(Debug, Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_notice(&self, chat_id: ChatId, text: &str) -> AppResult<()> {
        self.bot.send_message(chat_id, text).await?;
        Ok(())
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> AppResult<()> {
        self.bot
            .send_message(chat_id, html)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }

    async fn post_review(&self, destination: ChatId, post: &ReviewPost) -> AppResult<ReviewRef> {
        let keyboard = create_review_keyboard(&post.controls);

        let sent = match &post.photo {
            Some(file_id) => {
                self.bot
                    .send_photo(destination, InputFile::file_id(file_id.clone()))
                    .caption(post.body_html.clone())
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboard)
                    .await?
            }
            None => {
                self.bot
                    .send_message(destination, post.body_html.clone())
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboard)
                    .await?
            }
        };

        debug!(
            chat_id = %sent.chat.id,
            message_id = sent.id.0,
            has_photo = post.has_photo(),
            "Review card posted"
        );

        Ok(ReviewRef {
            chat_id: sent.chat.id,
            message_id: sent.id,
            has_photo: post.has_photo(),
        })
    }

    async fn edit_review_post(&self, review: &ReviewRef, body_html: &str) -> AppResult<()> {
        if review.has_photo {
            self.bot
                .edit_message_caption(review.chat_id, review.message_id)
                .caption(body_html.to_string())
                .parse_mode(ParseMode::Html)
                .await?;
        } else {
            self.bot
                .edit_message_text(review.chat_id, review.message_id, body_html)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Ok(())
    }
}
