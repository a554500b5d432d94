//! AI service client for the enhancement workflow.
//!
//! Three intents (enhance, follow-up, translate) map onto one
//! chat-completions endpoint. The client is a pure request/response mapping;
//! all session state lives in the orchestrator, and tests substitute a
//! scripted implementation of [`AiService`].
use crate::incident::IncidentDraft;
use crate::session::ConversationTurn;
use thiserror::Error;

mod client;
mod parse;
mod prompt;

pub use client::{GroqClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};

/// Failure classes surfaced to the orchestrator. The service-provided message
/// text is preserved through propagation; none of these are retried here.
#[derive(Debug, Error)]
pub enum AiError {
    /// Required input was missing; nothing was sent to the service.
    #[error("invalid request: {0}")]
    Validation(String),
    /// No credential was available when a call was attempted.
    #[error("no API credential available")]
    Unauthenticated,
    /// Network or HTTP failure, including non-2xx responses.
    #[error("AI service request failed: {0}")]
    Transport(String),
    /// The response arrived but no structured object could be parsed from it.
    #[error("malformed AI response: {0}")]
    MalformedReply(String),
}

/// Parsed reply to a follow-up request.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUpOutcome {
    /// The incoming draft with the user's new information folded in. Its
    /// `date` and `time` always come from the incoming draft, never the reply.
    pub updated_incident: IncidentDraft,
    /// Remaining clarification questions; empty means the record is complete.
    pub follow_up_questions: Vec<String>,
    /// Acknowledgement text to show the user.
    pub ai_message: String,
}

/// Capability interface over the text-generation service.
pub trait AiService {
    /// Enhance a raw description into a structured draft. The reply's
    /// `missing_info` drives whether a clarification round is needed.
    fn enhance(&self, draft: &IncidentDraft) -> Result<IncidentDraft, AiError>;

    /// Fold the user's clarification replies into the draft. `history` is the
    /// trailing conversation window, oldest first.
    fn follow_up(
        &self,
        draft: &IncidentDraft,
        history: &[ConversationTurn],
    ) -> Result<FollowUpOutcome, AiError>;

    /// Populate the Japanese side of the draft's bilingual fields.
    fn translate(&self, draft: &IncidentDraft) -> Result<IncidentDraft, AiError>;
}
