//! Dialogue Manager module driving the publicise conversation.
//!
//! [`PubliciseFlow`] owns the per-user sessions and turns inbound events into
//! state transitions plus outbound messages. Every per-event failure ends in a
//! user-visible reply and a safe state; the only errors returned are failures
//! to deliver that reply.

use std::sync::Arc;
use teloxide::types::{ChatId, FileId, UserId};
use teloxide::utils::html;
use tracing::{debug, info, Instrument};

use crate::destinations::DestinationProvider;
use crate::dialogue::{FlowStep, PhotoRef, PubliciseState, Session, SessionStore};
use crate::errors::{error_logging, AppResult};
use crate::localization::LocalizationManager;
use crate::markup;
use crate::observability;
use crate::review::{ControlToken, Messenger, ReviewAction, ReviewRef};

use super::ui_builder::{annotate_review_body, build_review_post};

/// Literal reply that skips the photo step
pub const SKIP_TOKEN: &str = "na";

/// Who sent an event and where to answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOrigin {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub private_chat: bool,
    pub language_code: Option<String>,
}

impl EventOrigin {
    /// Origin for a user writing to the bot in a private chat
    pub fn private(user_id: UserId) -> Self {
        Self {
            user_id,
            chat_id: ChatId::from(user_id),
            private_chat: true,
            language_code: None,
        }
    }

    fn lang(&self) -> Option<&str> {
        self.language_code.as_deref()
    }
}

/// Payload offered at the photo step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoPayload {
    Photo(FileId),
    Text(String),
}

/// Inbound events the flow understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    CommandPublicise(EventOrigin),
    TextOrSkip {
        origin: EventOrigin,
        text: String,
    },
    Photo {
        origin: EventOrigin,
        photo: FileId,
    },
    ControlActivated {
        origin: EventOrigin,
        token: String,
        review: ReviewRef,
        /// Review card body as displayed, rendered back to HTML
        current_html: String,
    },
    CommandFeedback {
        origin: EventOrigin,
        reason: String,
    },
}

impl InboundEvent {
    fn name(&self) -> &'static str {
        match self {
            InboundEvent::CommandPublicise(_) => "command_publicise",
            InboundEvent::TextOrSkip { .. } => "text",
            InboundEvent::Photo { .. } => "photo",
            InboundEvent::ControlActivated { .. } => "control",
            InboundEvent::CommandFeedback { .. } => "command_feedback",
        }
    }

    fn origin(&self) -> &EventOrigin {
        match self {
            InboundEvent::CommandPublicise(origin)
            | InboundEvent::TextOrSkip { origin, .. }
            | InboundEvent::Photo { origin, .. }
            | InboundEvent::ControlActivated { origin, .. }
            | InboundEvent::CommandFeedback { origin, .. } => origin,
        }
    }
}

/// The publicise conversation state machine
pub struct PubliciseFlow {
    sessions: SessionStore,
    messenger: Arc<dyn Messenger>,
    destinations: Arc<dyn DestinationProvider>,
    localization: Arc<LocalizationManager>,
    owner: Option<UserId>,
}

impl std::fmt::Debug for PubliciseFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubliciseFlow")
            .field("sessions", &self.sessions)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl PubliciseFlow {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        destinations: Arc<dyn DestinationProvider>,
        localization: Arc<LocalizationManager>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            messenger,
            destinations,
            localization,
            owner: None,
        }
    }

    /// Restrict the photo and text steps to a single user
    pub fn with_owner(mut self, owner: Option<UserId>) -> Self {
        self.owner = owner;
        self
    }

    /// Snapshot of a user's session
    pub fn session(&self, user_id: UserId) -> Session {
        self.sessions.get(user_id)
    }

    /// Route an inbound event to its operation
    pub async fn handle(&self, event: InboundEvent) -> AppResult<()> {
        let span = observability::flow_span(event.name(), event.origin().user_id.0);

        async move {
            match event {
                InboundEvent::CommandPublicise(origin) => self.start_publicise(&origin).await,
                InboundEvent::Photo { origin, photo } => {
                    if !self.accepts_flow_input(&origin) {
                        return Ok(());
                    }
                    self.submit_photo_or_skip(&origin, PhotoPayload::Photo(photo))
                        .await
                }
                InboundEvent::TextOrSkip { origin, text } => {
                    if !self.accepts_flow_input(&origin) {
                        return Ok(());
                    }
                    match self.sessions.state(origin.user_id) {
                        PubliciseState::AwaitingPhotoOrSkip => {
                            self.submit_photo_or_skip(&origin, PhotoPayload::Text(text))
                                .await
                        }
                        PubliciseState::AwaitingMessageText { .. } => {
                            self.submit_message_text(&origin, &text).await
                        }
                        PubliciseState::Idle => {
                            debug!(user_id = %origin.user_id, "Text outside the publicise flow ignored");
                            Ok(())
                        }
                    }
                }
                InboundEvent::ControlActivated {
                    origin,
                    token,
                    review,
                    current_html,
                } => {
                    self.handle_decision(&origin, &token, &review, &current_html)
                        .await
                }
                InboundEvent::CommandFeedback { origin, reason } => {
                    self.submit_rejection_reason(&origin, &reason).await
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Photo and text steps only come from private chats, and from the owner when one is set
    fn accepts_flow_input(&self, origin: &EventOrigin) -> bool {
        if !origin.private_chat {
            debug!(user_id = %origin.user_id, "Flow input outside a private chat ignored");
            return false;
        }
        match self.owner {
            Some(owner) if owner != origin.user_id => {
                debug!(user_id = %origin.user_id, "Flow input from non-owner ignored");
                false
            }
            _ => true,
        }
    }

    /// Begin (or restart) the flow; any in-flight session is discarded
    pub async fn start_publicise(&self, origin: &EventOrigin) -> AppResult<()> {
        info!(user_id = %origin.user_id, "Received /publicise command");
        let state = self.sessions.state(origin.user_id).transition(FlowStep::Start)?;
        self.sessions.reset(origin.user_id);
        self.sessions.set_state(origin.user_id, state);
        observability::record_publicise_event("start");

        self.reply(origin, "publicise-prompt").await
    }

    /// Photo step: accept a photo or the skip token, otherwise guide the user
    pub async fn submit_photo_or_skip(
        &self,
        origin: &EventOrigin,
        payload: PhotoPayload,
    ) -> AppResult<()> {
        let state = self.sessions.state(origin.user_id);
        if state != PubliciseState::AwaitingPhotoOrSkip {
            debug!(user_id = %origin.user_id, state = ?state, "Photo step event ignored");
            return Ok(());
        }

        let (photo, confirmation) = match payload {
            PhotoPayload::Photo(file_id) => (PhotoRef::File(file_id), "publicise-photo-confirmed"),
            PhotoPayload::Text(text) if text.trim().eq_ignore_ascii_case(SKIP_TOKEN) => {
                (PhotoRef::None, "publicise-skip-confirmed")
            }
            PhotoPayload::Text(_) => {
                return self.reply(origin, "publicise-photo-invalid").await;
            }
        };

        let next = state.transition(FlowStep::PhotoChosen(photo))?;
        self.sessions.set_state(origin.user_id, next);
        observability::record_publicise_event("photo_step");
        debug!(user_id = %origin.user_id, "Photo step completed");

        self.reply(origin, confirmation).await
    }

    /// Message step: translate, post for review, then clear the session
    pub async fn submit_message_text(&self, origin: &EventOrigin, raw_text: &str) -> AppResult<()> {
        let state = self.sessions.state(origin.user_id);
        let photo = match &state {
            PubliciseState::AwaitingMessageText { photo } => photo.clone(),
            _ => {
                debug!(user_id = %origin.user_id, state = ?state, "Message step event ignored");
                return Ok(());
            }
        };

        let body_html = match markup::translate(raw_text) {
            Ok(body_html) => body_html,
            Err(e) => {
                error_logging::log_format_error(&e, origin.user_id.0, raw_text);
                observability::record_markup_rejection();
                return self.reply(origin, "publicise-invalid-formatting").await;
            }
        };

        let post = build_review_post(origin.user_id, &photo, &body_html, &self.localization, None);
        let delivery = match self.destinations.current_destination() {
            Ok(destination) => self.messenger.post_review(destination, &post).await,
            Err(e) => {
                error_logging::log_config_error(&e, "CHAT_LIST_PATH", "current_destination");
                Err(e)
            }
        };
        observability::record_review_post(delivery.is_ok(), post.has_photo());

        // Delivered or not, the draft is not kept
        let idle = state.transition(FlowStep::Submitted)?;
        self.sessions.reset(origin.user_id);
        self.sessions.set_state(origin.user_id, idle);

        match delivery {
            Ok(review) => {
                info!(
                    user_id = %origin.user_id,
                    review_chat_id = %review.chat_id,
                    review_message_id = review.message_id.0,
                    has_photo = review.has_photo,
                    "Message sent to review chat for verification"
                );
                self.reply(origin, "publicise-submitted").await
            }
            Err(e) => {
                error_logging::log_delivery_error(
                    &e,
                    "post_review",
                    Some(origin.user_id.0),
                    None,
                );
                self.reply(origin, "publicise-submit-failed").await
            }
        }
    }

    /// Moderator pressed accept or reject on a review card
    pub async fn handle_decision(
        &self,
        moderator: &EventOrigin,
        token: &str,
        review: &ReviewRef,
        current_html: &str,
    ) -> AppResult<()> {
        let decision = match ControlToken::decode(token) {
            Ok(decision) => decision,
            Err(e) => {
                error_logging::log_decode_error(&e, token, moderator.user_id.0);
                observability::record_review_decision("invalid");
                return self.annotate_error(review, current_html).await;
            }
        };

        match decision.action {
            ReviewAction::Accept => {
                let notice = self.localization.t("decision-accepted-notice", None);
                if let Err(e) = self
                    .messenger
                    .send_notice(ChatId::from(decision.user_id), &notice)
                    .await
                {
                    error_logging::log_delivery_error(
                        &e,
                        "notify_accepted",
                        Some(decision.user_id.0),
                        None,
                    );
                    return self.annotate_error(review, current_html).await;
                }

                let annotation = self.localization.t("review-action-accepted", None);
                if let Err(e) = self
                    .messenger
                    .edit_review_post(review, &annotate_review_body(current_html, &annotation))
                    .await
                {
                    error_logging::log_delivery_error(
                        &e,
                        "annotate_accepted",
                        None,
                        Some(review.chat_id.0),
                    );
                    return self.annotate_error(review, current_html).await;
                }
                observability::record_review_decision("accept");
                info!(
                    moderator_id = %moderator.user_id,
                    submitter_id = %decision.user_id,
                    "Publicity message accepted"
                );
            }
            ReviewAction::Reject => {
                let annotation = self.localization.t("review-action-rejected", None);
                if let Err(e) = self
                    .messenger
                    .edit_review_post(review, &annotate_review_body(current_html, &annotation))
                    .await
                {
                    error_logging::log_delivery_error(
                        &e,
                        "annotate_rejected",
                        None,
                        Some(review.chat_id.0),
                    );
                    return self.annotate_error(review, current_html).await;
                }

                self.sessions
                    .set_rejection_target(moderator.user_id, decision.user_id);
                observability::record_review_decision("reject");
                info!(
                    moderator_id = %moderator.user_id,
                    submitter_id = %decision.user_id,
                    "Publicity message rejected, awaiting reason"
                );
            }
        }

        Ok(())
    }

    /// `/feedback <reason>` from the moderator who rejected a message
    pub async fn submit_rejection_reason(
        &self,
        moderator: &EventOrigin,
        reason: &str,
    ) -> AppResult<()> {
        let target = match self.sessions.rejection_target(moderator.user_id) {
            Some(target) => target,
            None => {
                observability::record_rejection_feedback("no_target");
                return self.reply(moderator, "feedback-no-rejection").await;
            }
        };

        let reason = reason.trim();
        if reason.is_empty() {
            observability::record_rejection_feedback("empty");
            return self.reply(moderator, "feedback-missing-reason").await;
        }

        let notice = self.localization.t_args(
            "rejection-notice",
            &[("reason", html::escape(reason).as_str())],
            None,
        );
        match self.messenger.send_html(ChatId::from(target), &notice).await {
            Ok(()) => {
                self.sessions.clear_rejection_target(moderator.user_id);
                observability::record_rejection_feedback("sent");
                info!(
                    moderator_id = %moderator.user_id,
                    submitter_id = %target,
                    "Rejection reason delivered"
                );
                self.reply(moderator, "feedback-sent").await
            }
            Err(e) => {
                error_logging::log_delivery_error(
                    &e,
                    "send_rejection_reason",
                    Some(target.0),
                    None,
                );
                observability::record_rejection_feedback("failed");
                self.reply(moderator, "feedback-failed").await
            }
        }
    }

    async fn annotate_error(&self, review: &ReviewRef, current_html: &str) -> AppResult<()> {
        let annotation = self.localization.t("review-action-error", None);
        self.messenger
            .edit_review_post(review, &annotate_review_body(current_html, &annotation))
            .await
    }

    async fn reply(&self, origin: &EventOrigin, key: &str) -> AppResult<()> {
        let text = self.localization.t(key, origin.lang());
        self.messenger.send_notice(origin.chat_id, &text).await
    }
}
