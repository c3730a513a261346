//! Review channel types: the card posted for moderation, the tokens carried
//! by its accept/reject controls, and the messaging collaborator used to
//! deliver everything.

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use teloxide::types::{ChatId, FileId, MessageId, UserId};

use crate::errors::AppResult;

const TOKEN_SEPARATOR: char = '|';

/// Moderator decision carried by a review control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Accept,
    Reject,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Accept => "accept",
            ReviewAction::Reject => "reject",
        }
    }
}

/// Reasons a control token could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Token has no `|` or more than one
    Malformed(String),
    UnknownAction(String),
    InvalidUserId(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Malformed(token) => {
                write!(f, "expected '<action>|<user id>', got '{}'", token)
            }
            DecodeError::UnknownAction(action) => write!(f, "unknown review action '{}'", action),
            DecodeError::InvalidUserId(id) => write!(f, "invalid user id '{}'", id),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Opaque callback payload round-tripped through an inline button:
/// `accept|<user id>` or `reject|<user id>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlToken {
    pub action: ReviewAction,
    pub user_id: UserId,
}

impl ControlToken {
    pub fn new(action: ReviewAction, user_id: UserId) -> Self {
        Self { action, user_id }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        raw.parse()
    }
}

impl fmt::Display for ControlToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.action.as_str(), TOKEN_SEPARATOR, self.user_id.0)
    }
}

impl FromStr for ControlToken {
    type Err = DecodeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split(TOKEN_SEPARATOR);
        let (action, user_id) = match (parts.next(), parts.next(), parts.next()) {
            (Some(action), Some(user_id), None) => (action, user_id),
            _ => return Err(DecodeError::Malformed(raw.to_string())),
        };

        let action = match action {
            "accept" => ReviewAction::Accept,
            "reject" => ReviewAction::Reject,
            other => return Err(DecodeError::UnknownAction(other.to_string())),
        };
        let user_id = user_id
            .parse::<u64>()
            .map_err(|_| DecodeError::InvalidUserId(user_id.to_string()))?;

        Ok(Self::new(action, UserId(user_id)))
    }
}

/// One inline button on a review card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewControl {
    pub label: String,
    pub token: ControlToken,
}

/// Review card ready to be posted to the destination chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPost {
    pub submitter: UserId,
    pub photo: Option<FileId>,
    pub body_html: String,
    pub controls: Vec<ReviewControl>,
}

impl ReviewPost {
    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }
}

/// Handle to a posted review card, enough to edit it later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    /// Photo cards are edited through their caption
    pub has_photo: bool,
}

/// Outbound side of the bot: notices to users and the review card lifecycle
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Plain-text prompt, confirmation or error notice
    async fn send_notice(&self, chat_id: ChatId, text: &str) -> AppResult<()>;

    /// Message rendered with Telegram's HTML parse mode
    async fn send_html(&self, chat_id: ChatId, html: &str) -> AppResult<()>;

    async fn post_review(&self, destination: ChatId, post: &ReviewPost) -> AppResult<ReviewRef>;

    async fn edit_review_post(&self, review: &ReviewRef, body_html: &str) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_encoding() {
        let token = ControlToken::new(ReviewAction::Reject, UserId(123456789));
        assert_eq!(token.encode(), "reject|123456789");
        assert_eq!(ControlToken::decode("reject|123456789").unwrap(), token);
        assert_eq!(
            ControlToken::decode("accept|5").unwrap(),
            ControlToken::new(ReviewAction::Accept, UserId(5))
        );
    }

    #[test]
    fn test_token_decode_failures() {
        assert_eq!(
            ControlToken::decode("accept"),
            Err(DecodeError::Malformed("accept".to_string()))
        );
        assert_eq!(
            ControlToken::decode("accept|1|2"),
            Err(DecodeError::Malformed("accept|1|2".to_string()))
        );
        assert_eq!(
            ControlToken::decode("publish|1"),
            Err(DecodeError::UnknownAction("publish".to_string()))
        );
        assert_eq!(
            ControlToken::decode("accept|-4"),
            Err(DecodeError::InvalidUserId("-4".to_string()))
        );
        assert!(ControlToken::decode("").is_err());
    }
}
