//! Conversation and session state for one in-progress enhancement.
//!
//! Exactly one session exists at a time; starting a new enhancement resets
//! it. All state is held here explicitly so the orchestrator's transitions
//! stay independently testable.
use crate::incident::IncidentDraft;
use serde::{Deserialize, Serialize};

/// How many trailing turns accompany a follow-up request. Older context is
/// dropped, not summarized.
pub const HISTORY_WINDOW: usize = 5;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Assistant,
    User,
}

/// One message in the clarification exchange, ordered by append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Orchestrator states for the enhance → clarify → translate protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Enhancing,
    AwaitingUser,
    Translating,
    Done,
    Failed,
}

/// Process-wide state for one in-progress enhancement.
///
/// Invariant: `awaiting_user_reply` is true iff the last turn is
/// assistant-authored and at least one clarification item is outstanding.
#[derive(Debug, Clone, Default)]
pub struct EnhancementSession {
    pub state: SessionState,
    pub draft: IncidentDraft,
    pub history: Vec<ConversationTurn>,
    pub awaiting_user_reply: bool,
}

impl EnhancementSession {
    /// Discard the draft and history, returning to `Idle`.
    pub fn reset(&mut self) {
        *self = EnhancementSession::default();
    }

    /// Append one turn to the conversation.
    pub fn push_turn(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(ConversationTurn {
            role,
            content: content.into(),
        });
    }

    /// The trailing window of turns sent with follow-up requests.
    pub fn recent_history(&self) -> &[ConversationTurn] {
        let start = self.history.len().saturating_sub(HISTORY_WINDOW);
        &self.history[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_history_keeps_only_trailing_window() {
        let mut session = EnhancementSession::default();
        for index in 0..8 {
            session.push_turn(Role::User, format!("turn {index}"));
        }
        let recent = session.recent_history();
        assert_eq!(recent.len(), HISTORY_WINDOW);
        assert_eq!(recent[0].content, "turn 3");
        assert_eq!(recent[4].content, "turn 7");
    }

    #[test]
    fn recent_history_handles_short_conversations() {
        let mut session = EnhancementSession::default();
        session.push_turn(Role::Assistant, "hello");
        assert_eq!(session.recent_history().len(), 1);
    }

    #[test]
    fn reset_clears_draft_history_and_flags() {
        let mut session = EnhancementSession {
            state: SessionState::AwaitingUser,
            awaiting_user_reply: true,
            ..EnhancementSession::default()
        };
        session.draft.date = "2024-03-01".to_string();
        session.push_turn(Role::Assistant, "questions");

        session.reset();

        assert_eq!(session.state, SessionState::Idle);
        assert!(session.draft.date.is_empty());
        assert!(session.history.is_empty());
        assert!(!session.awaiting_user_reply);
    }
}
