//! Publicise dialogue module for per-user conversation state.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use teloxide::types::{FileId, UserId};

use crate::errors::{AppError, AppResult};

/// Photo chosen for a publicity message, or the explicit "no picture" choice
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoRef {
    None,
    File(FileId),
}

impl PhotoRef {
    pub fn file_id(&self) -> Option<&FileId> {
        match self {
            PhotoRef::None => None,
            PhotoRef::File(file_id) => Some(file_id),
        }
    }
}

/// Represents the conversation state of the publicise flow
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PubliciseState {
    #[default]
    Idle,
    AwaitingPhotoOrSkip,
    AwaitingMessageText {
        photo: PhotoRef,
    },
}

/// Inputs that move the publicise flow forward
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowStep {
    Start,
    PhotoChosen(PhotoRef),
    Submitted,
}

impl PubliciseState {
    /// Transition function of the flow; `Start` is accepted from any state
    pub fn transition(&self, step: FlowStep) -> AppResult<PubliciseState> {
        match (self, step) {
            (_, FlowStep::Start) => Ok(PubliciseState::AwaitingPhotoOrSkip),
            (PubliciseState::AwaitingPhotoOrSkip, FlowStep::PhotoChosen(photo)) => {
                Ok(PubliciseState::AwaitingMessageText { photo })
            }
            (PubliciseState::AwaitingMessageText { .. }, FlowStep::Submitted) => {
                Ok(PubliciseState::Idle)
            }
            (state, step) => Err(AppError::InvalidState(format!(
                "{:?} is not accepted while {:?}",
                step, state
            ))),
        }
    }
}

/// Everything remembered about one user between updates
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub state: PubliciseState,
    /// Submitter awaiting a rejection reason from this moderator
    pub rejection_target: Option<UserId>,
}

impl Session {
    pub fn photo_ref(&self) -> Option<&PhotoRef> {
        match &self.state {
            PubliciseState::AwaitingMessageText { photo } => Some(photo),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state == PubliciseState::Idle && self.rejection_target.is_none()
    }
}

/// In-memory session storage keyed by Telegram user.
///
/// Entries are dropped as soon as they return to the empty session, so the
/// map only holds users with something in flight. Concurrent updates for the
/// same user are not serialized; the last write wins.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the user's session (empty if none is recorded)
    pub fn get(&self, user_id: UserId) -> Session {
        self.sessions
            .lock()
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn state(&self, user_id: UserId) -> PubliciseState {
        self.get(user_id).state
    }

    pub fn set_state(&self, user_id: UserId, state: PubliciseState) {
        self.update(user_id, |session| session.state = state);
    }

    /// Forget everything about the user, including a pending rejection
    pub fn reset(&self, user_id: UserId) {
        self.sessions.lock().remove(&user_id);
    }

    pub fn rejection_target(&self, moderator_id: UserId) -> Option<UserId> {
        self.get(moderator_id).rejection_target
    }

    pub fn set_rejection_target(&self, moderator_id: UserId, target: UserId) {
        self.update(moderator_id, |session| session.rejection_target = Some(target));
    }

    pub fn clear_rejection_target(&self, moderator_id: UserId) {
        self.update(moderator_id, |session| session.rejection_target = None);
    }

    /// Number of users with a non-empty session
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(&self, user_id: UserId, f: impl FnOnce(&mut Session)) {
        let mut sessions = self.sessions.lock();
        let session = sessions.entry(user_id).or_default();
        f(session);
        if session.is_empty() {
            sessions.remove(&user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_happy_path() {
        let state = PubliciseState::Idle
            .transition(FlowStep::Start)
            .unwrap();
        assert_eq!(state, PubliciseState::AwaitingPhotoOrSkip);

        let state = state.transition(FlowStep::PhotoChosen(PhotoRef::None)).unwrap();
        assert_eq!(
            state,
            PubliciseState::AwaitingMessageText {
                photo: PhotoRef::None
            }
        );

        let state = state.transition(FlowStep::Submitted).unwrap();
        assert_eq!(state, PubliciseState::Idle);
    }

    #[test]
    fn test_transition_rejects_out_of_order_steps() {
        assert!(matches!(
            PubliciseState::Idle.transition(FlowStep::Submitted),
            Err(AppError::InvalidState(_))
        ));
        assert!(PubliciseState::Idle
            .transition(FlowStep::PhotoChosen(PhotoRef::None))
            .is_err());
        assert!(PubliciseState::AwaitingPhotoOrSkip
            .transition(FlowStep::Submitted)
            .is_err());
    }

    #[test]
    fn test_start_overwrites_in_flight_flow() {
        let state = PubliciseState::AwaitingMessageText {
            photo: PhotoRef::File(FileId("abc".to_string())),
        };
        assert_eq!(
            state.transition(FlowStep::Start).unwrap(),
            PubliciseState::AwaitingPhotoOrSkip
        );
    }

    #[test]
    fn test_store_drops_empty_sessions() {
        let store = SessionStore::new();
        let user = UserId(42);

        store.set_state(user, PubliciseState::AwaitingPhotoOrSkip);
        assert_eq!(store.len(), 1);

        store.set_state(user, PubliciseState::Idle);
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejection_marker_is_independent_of_flow_state() {
        let store = SessionStore::new();
        let moderator = UserId(1);

        store.set_state(moderator, PubliciseState::AwaitingPhotoOrSkip);
        store.set_rejection_target(moderator, UserId(7));
        store.set_state(moderator, PubliciseState::Idle);

        assert_eq!(store.rejection_target(moderator), Some(UserId(7)));
        store.clear_rejection_target(moderator);
        assert_eq!(store.rejection_target(moderator), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_reset_clears_marker_too() {
        let store = SessionStore::new();
        let user = UserId(3);
        store.set_rejection_target(user, UserId(9));
        store.reset(user);
        assert_eq!(store.get(user), Session::default());
    }
}
