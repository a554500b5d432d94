//! Enhancement orchestrator: drives the enhance → clarify → translate loop.
//!
//! The orchestrator owns the single [`EnhancementSession`] and sequences all
//! service calls; at most one call is conceptually outstanding at a time, and
//! enhancement and translation are never run in parallel. Failure policy:
//! a failed first enhancement returns to `Idle` with the error surfaced
//! verbatim, a failed follow-up round completes best-effort by translating
//! the best-known draft, and a failed translation marks the session `Failed`
//! while retaining the draft for inspection.
use crate::ai::{AiError, AiService};
use crate::extract;
use crate::incident::{IncidentDraft, IncidentRecord};
use crate::session::{EnhancementSession, Role, SessionState};

/// Inputs for starting a new enhancement session.
#[derive(Debug, Clone, Default)]
pub struct EnhancementRequest {
    /// Free-text incident description; must be non-empty.
    pub description: String,
    /// Optional date override; otherwise extracted from the text.
    pub date: Option<String>,
    /// Optional time override; otherwise extracted from the text.
    pub time: Option<String>,
}

/// What the caller should do after a round completes.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The service needs clarification; show the message and collect a reply.
    NeedsInput { message: String },
    /// The draft is finalized and translated, pending accept or reject.
    Completed { draft: IncidentDraft },
}

/// Drives the multi-round enhancement protocol to completion or abandonment.
pub struct Orchestrator<S> {
    service: S,
    session: EnhancementSession,
}

impl<S: AiService> Orchestrator<S> {
    pub fn new(service: S) -> Self {
        Orchestrator {
            service,
            session: EnhancementSession::default(),
        }
    }

    /// Current state, for callers that gate UI actions on it.
    pub fn state(&self) -> SessionState {
        self.session.state
    }

    /// Read-only view of the session for previews and transcripts.
    pub fn session(&self) -> &EnhancementSession {
        &self.session
    }

    /// Start a new session from a free-text description.
    ///
    /// Resets any prior `AwaitingUser`/`Done`/`Failed` session. Rejected with
    /// a validation error when the description is empty or a call is still
    /// conceptually outstanding.
    pub fn start_enhancement(&mut self, request: EnhancementRequest) -> Result<Outcome, AiError> {
        if matches!(
            self.session.state,
            SessionState::Enhancing | SessionState::Translating
        ) {
            return Err(AiError::Validation(
                "an enhancement call is already in progress".to_string(),
            ));
        }
        if request.description.trim().is_empty() {
            return Err(AiError::Validation(
                "incident description is required".to_string(),
            ));
        }
        self.session.reset();

        let info = extract::extract_incident_info(&request.description);
        let draft = IncidentDraft {
            date: request.date.unwrap_or(info.date),
            time: request.time.unwrap_or(info.time),
            raw_input: request.description,
            ..IncidentDraft::default()
        };
        tracing::info!(date = %draft.date, time = %draft.time, "starting enhancement session");

        self.session.state = SessionState::Enhancing;
        match self.service.enhance(&draft) {
            Ok(enhanced) => {
                self.session.draft = enhanced;
                self.after_enhancement_round()
            }
            Err(err) => {
                // No draft exists yet; surface the error verbatim.
                self.session.reset();
                Err(err)
            }
        }
    }

    /// Feed one user reply into an `AwaitingUser` session.
    pub fn submit_reply(&mut self, reply: &str) -> Result<Outcome, AiError> {
        if self.session.state != SessionState::AwaitingUser || !self.session.awaiting_user_reply {
            return Err(AiError::Validation(
                "no clarification is pending".to_string(),
            ));
        }
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(AiError::Validation("reply is empty".to_string()));
        }
        self.session.push_turn(Role::User, reply);
        self.session.awaiting_user_reply = false;
        self.session.state = SessionState::Enhancing;

        let history = self.session.recent_history().to_vec();
        match self.service.follow_up(&self.session.draft, &history) {
            Ok(outcome) => {
                self.session.draft = outcome.updated_incident;
                if outcome.follow_up_questions.is_empty() {
                    let acknowledgement = if outcome.ai_message.trim().is_empty() {
                        "Thank you for providing the additional information. I will now enhance your incident report.".to_string()
                    } else {
                        outcome.ai_message
                    };
                    self.session.push_turn(Role::Assistant, acknowledgement);
                    self.translate_draft()
                } else {
                    let message = if outcome.ai_message.trim().is_empty() {
                        follow_up_message(&outcome.follow_up_questions)
                    } else {
                        outcome.ai_message
                    };
                    self.session.draft.missing_info = outcome.follow_up_questions;
                    self.enter_awaiting(message)
                }
            }
            Err(err) => {
                // Best-effort completion: finish with what was collected
                // rather than dropping the user's answers.
                tracing::warn!(error = %err, "follow-up failed; translating best-known draft");
                self.session.push_turn(
                    Role::Assistant,
                    "I ran into a problem processing your response. I will enhance your incident report with the information I have.",
                );
                self.translate_draft()
            }
        }
    }

    /// Copy a `Done` session's finalized fields into the caller's record,
    /// proposing evidence rows, then reset to `Idle`.
    pub fn accept(&mut self, record: &mut IncidentRecord) -> Result<(), AiError> {
        if self.session.state != SessionState::Done {
            return Err(AiError::Validation(
                "no finalized enhancement to accept".to_string(),
            ));
        }
        record.apply_enhancement(&self.session.draft);
        self.session.reset();
        Ok(())
    }

    /// Discard the session's draft and history; the caller's record is
    /// untouched. Safe to call in any state.
    pub fn reject(&mut self) {
        self.session.reset();
    }

    fn after_enhancement_round(&mut self) -> Result<Outcome, AiError> {
        if self.session.draft.missing_info.is_empty() {
            return self.translate_draft();
        }
        let message = missing_info_message(&self.session.draft.missing_info);
        self.enter_awaiting(message)
    }

    fn enter_awaiting(&mut self, message: String) -> Result<Outcome, AiError> {
        self.session.push_turn(Role::Assistant, message.clone());
        self.session.awaiting_user_reply = true;
        self.session.state = SessionState::AwaitingUser;
        Ok(Outcome::NeedsInput { message })
    }

    fn translate_draft(&mut self) -> Result<Outcome, AiError> {
        self.session.state = SessionState::Translating;
        match self.service.translate(&self.session.draft) {
            Ok(translated) => {
                self.session.draft = translated;
                self.session.state = SessionState::Done;
                tracing::info!("enhancement session complete");
                Ok(Outcome::Completed {
                    draft: self.session.draft.clone(),
                })
            }
            Err(err) => {
                // Keep the draft so partial progress stays inspectable.
                self.session.state = SessionState::Failed;
                Err(err)
            }
        }
    }
}

fn missing_info_message(items: &[String]) -> String {
    let bullets = items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("I need some additional information to enhance your incident report:\n{bullets}")
}

fn follow_up_message(questions: &[String]) -> String {
    let bullets = questions
        .iter()
        .map(|question| format!("- {question}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Thank you. I have a few more questions:\n{bullets}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FollowUpOutcome;
    use crate::incident::Bilingual;
    use crate::session::ConversationTurn;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Scripted stand-in for the real endpoint.
    struct ScriptedService {
        enhance_replies: RefCell<VecDeque<Result<IncidentDraft, AiError>>>,
        follow_up_replies: RefCell<VecDeque<Result<FollowUpOutcome, AiError>>>,
        translate_replies: RefCell<VecDeque<Result<IncidentDraft, AiError>>>,
        enhance_calls: Cell<usize>,
        follow_up_calls: Cell<usize>,
        translate_calls: Cell<usize>,
        last_history_len: Cell<usize>,
    }

    impl ScriptedService {
        fn new() -> Self {
            ScriptedService {
                enhance_replies: RefCell::new(VecDeque::new()),
                follow_up_replies: RefCell::new(VecDeque::new()),
                translate_replies: RefCell::new(VecDeque::new()),
                enhance_calls: Cell::new(0),
                follow_up_calls: Cell::new(0),
                translate_calls: Cell::new(0),
                last_history_len: Cell::new(0),
            }
        }

        fn script_enhance(self, reply: Result<IncidentDraft, AiError>) -> Self {
            self.enhance_replies.borrow_mut().push_back(reply);
            self
        }

        fn script_follow_up(self, reply: Result<FollowUpOutcome, AiError>) -> Self {
            self.follow_up_replies.borrow_mut().push_back(reply);
            self
        }

        fn script_translate(self, reply: Result<IncidentDraft, AiError>) -> Self {
            self.translate_replies.borrow_mut().push_back(reply);
            self
        }
    }

    impl AiService for ScriptedService {
        fn enhance(&self, _draft: &IncidentDraft) -> Result<IncidentDraft, AiError> {
            self.enhance_calls.set(self.enhance_calls.get() + 1);
            self.enhance_replies
                .borrow_mut()
                .pop_front()
                .expect("unscripted enhance call")
        }

        fn follow_up(
            &self,
            _draft: &IncidentDraft,
            history: &[ConversationTurn],
        ) -> Result<FollowUpOutcome, AiError> {
            self.follow_up_calls.set(self.follow_up_calls.get() + 1);
            self.last_history_len.set(history.len());
            self.follow_up_replies
                .borrow_mut()
                .pop_front()
                .expect("unscripted follow-up call")
        }

        fn translate(&self, _draft: &IncidentDraft) -> Result<IncidentDraft, AiError> {
            self.translate_calls.set(self.translate_calls.get() + 1);
            self.translate_replies
                .borrow_mut()
                .pop_front()
                .expect("unscripted translate call")
        }
    }

    fn enhanced_draft(missing: &[&str]) -> IncidentDraft {
        IncidentDraft {
            date: "2024-03-01".to_string(),
            time: "10:30".to_string(),
            title: Bilingual::en("Shouting in meeting"),
            category: Bilingual::en("Verbal Abuse"),
            description: Bilingual::en("Manager shouted during the weekly meeting."),
            missing_info: missing.iter().map(|item| item.to_string()).collect(),
            ..IncidentDraft::default()
        }
    }

    fn translated(mut draft: IncidentDraft) -> IncidentDraft {
        draft.title.ja = "会議での怒鳴り".to_string();
        draft.category.ja = "言葉による暴力".to_string();
        draft.description.ja = "翻訳済みの説明。".to_string();
        draft
    }

    fn request() -> EnhancementRequest {
        EnhancementRequest {
            description: "Manager shouted at me in the meeting on 2024-03-01 at 10:30".to_string(),
            date: None,
            time: None,
        }
    }

    #[test]
    fn empty_description_is_rejected_before_any_call() {
        let service = ScriptedService::new();
        let mut orchestrator = Orchestrator::new(service);
        let err = orchestrator
            .start_enhancement(EnhancementRequest::default())
            .unwrap_err();
        assert!(matches!(err, AiError::Validation(_)));
        assert_eq!(orchestrator.state(), SessionState::Idle);
        assert_eq!(orchestrator.service.enhance_calls.get(), 0);
    }

    #[test]
    fn complete_reply_goes_straight_to_translation() {
        let service = ScriptedService::new()
            .script_enhance(Ok(enhanced_draft(&[])))
            .script_translate(Ok(translated(enhanced_draft(&[]))));
        let mut orchestrator = Orchestrator::new(service);

        let outcome = orchestrator.start_enhancement(request()).expect("complete");

        assert_eq!(orchestrator.service.enhance_calls.get(), 1);
        assert_eq!(orchestrator.service.translate_calls.get(), 1);
        assert_eq!(orchestrator.service.follow_up_calls.get(), 0);
        assert_eq!(orchestrator.state(), SessionState::Done);
        match outcome {
            Outcome::Completed { draft } => {
                assert_eq!(draft.title.ja, "会議での怒鳴り");
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn missing_info_produces_bulleted_question_turn() {
        let service = ScriptedService::new().script_enhance(Ok(enhanced_draft(&[
            "location of incident",
            "witnesses present",
        ])));
        let mut orchestrator = Orchestrator::new(service);

        let outcome = orchestrator.start_enhancement(request()).expect("questions");

        assert_eq!(orchestrator.state(), SessionState::AwaitingUser);
        assert!(orchestrator.session().awaiting_user_reply);
        let Outcome::NeedsInput { message } = outcome else {
            panic!("expected questions");
        };
        assert!(message.contains("- location of incident"));
        assert!(message.contains("- witnesses present"));
        let last = orchestrator.session().history.last().expect("turn");
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, message);
    }

    #[test]
    fn user_reply_triggers_exactly_one_follow_up_then_translation() {
        let updated = enhanced_draft(&[]);
        let service = ScriptedService::new()
            .script_enhance(Ok(enhanced_draft(&["location of incident"])))
            .script_follow_up(Ok(FollowUpOutcome {
                updated_incident: updated.clone(),
                follow_up_questions: Vec::new(),
                ai_message: "Thank you, I have everything I need.".to_string(),
            }))
            .script_translate(Ok(translated(updated)));
        let mut orchestrator = Orchestrator::new(service);

        orchestrator.start_enhancement(request()).expect("questions");
        let outcome = orchestrator
            .submit_reply("It happened in the third-floor meeting room.")
            .expect("complete");

        assert_eq!(orchestrator.service.follow_up_calls.get(), 1);
        assert_eq!(orchestrator.service.translate_calls.get(), 1);
        assert!(!orchestrator.session().awaiting_user_reply);
        assert_eq!(orchestrator.state(), SessionState::Done);
        assert!(matches!(outcome, Outcome::Completed { .. }));
    }

    #[test]
    fn follow_up_questions_loop_back_to_awaiting_user() {
        let mut updated = enhanced_draft(&[]);
        updated.description.en.push_str(" It was in the meeting room.");
        let service = ScriptedService::new()
            .script_enhance(Ok(enhanced_draft(&["location of incident"])))
            .script_follow_up(Ok(FollowUpOutcome {
                updated_incident: updated,
                follow_up_questions: vec!["were there witnesses?".to_string()],
                ai_message: String::new(),
            }));
        let mut orchestrator = Orchestrator::new(service);

        orchestrator.start_enhancement(request()).expect("questions");
        let outcome = orchestrator.submit_reply("the meeting room").expect("more questions");

        assert_eq!(orchestrator.state(), SessionState::AwaitingUser);
        assert!(orchestrator.session().awaiting_user_reply);
        let Outcome::NeedsInput { message } = outcome else {
            panic!("expected another round");
        };
        assert!(message.contains("- were there witnesses?"));
    }

    #[test]
    fn first_call_failure_returns_to_idle_with_error_verbatim() {
        let service = ScriptedService::new()
            .script_enhance(Err(AiError::Transport("connection refused".to_string())));
        let mut orchestrator = Orchestrator::new(service);

        let err = orchestrator.start_enhancement(request()).unwrap_err();

        assert!(matches!(err, AiError::Transport(ref detail) if detail == "connection refused"));
        assert_eq!(orchestrator.state(), SessionState::Idle);
        assert!(orchestrator.session().history.is_empty());
        assert_eq!(orchestrator.service.translate_calls.get(), 0);
    }

    #[test]
    fn follow_up_failure_completes_best_effort_via_translation() {
        let service = ScriptedService::new()
            .script_enhance(Ok(enhanced_draft(&["location of incident"])))
            .script_follow_up(Err(AiError::MalformedReply("not json".to_string())))
            .script_translate(Ok(translated(enhanced_draft(&["location of incident"]))));
        let mut orchestrator = Orchestrator::new(service);

        orchestrator.start_enhancement(request()).expect("questions");
        let outcome = orchestrator.submit_reply("the meeting room").expect("best effort");

        assert_eq!(orchestrator.state(), SessionState::Done);
        assert!(matches!(outcome, Outcome::Completed { .. }));
        assert_eq!(orchestrator.service.translate_calls.get(), 1);
    }

    #[test]
    fn translation_failure_marks_session_failed_but_keeps_draft() {
        let service = ScriptedService::new()
            .script_enhance(Ok(enhanced_draft(&[])))
            .script_translate(Err(AiError::Transport("HTTP 500".to_string())));
        let mut orchestrator = Orchestrator::new(service);

        let err = orchestrator.start_enhancement(request()).unwrap_err();

        assert!(matches!(err, AiError::Transport(_)));
        assert_eq!(orchestrator.state(), SessionState::Failed);
        assert_eq!(orchestrator.session().draft.title.en, "Shouting in meeting");
    }

    #[test]
    fn follow_up_request_carries_trailing_history_window() {
        let mut service = ScriptedService::new()
            .script_enhance(Ok(enhanced_draft(&["q1"])));
        for _ in 0..4 {
            service = service.script_follow_up(Ok(FollowUpOutcome {
                updated_incident: enhanced_draft(&["qn"]),
                follow_up_questions: vec!["next?".to_string()],
                ai_message: String::new(),
            }));
        }
        let mut orchestrator = Orchestrator::new(service);

        orchestrator.start_enhancement(request()).expect("questions");
        for round in 0..4 {
            orchestrator
                .submit_reply(&format!("answer {round}"))
                .expect("round");
        }

        // 8 turns exist by the last call; only the trailing window is sent.
        assert_eq!(orchestrator.service.last_history_len.get(), 5);
    }

    #[test]
    fn reject_is_idempotent_and_returns_to_idle() {
        let service = ScriptedService::new()
            .script_enhance(Ok(enhanced_draft(&["location of incident"])));
        let mut orchestrator = Orchestrator::new(service);

        orchestrator.start_enhancement(request()).expect("questions");
        orchestrator.reject();
        orchestrator.reject();

        assert_eq!(orchestrator.state(), SessionState::Idle);
        assert!(orchestrator.session().history.is_empty());
        assert_eq!(orchestrator.session().draft, IncidentDraft::default());
    }

    #[test]
    fn accept_requires_a_finished_session() {
        let service = ScriptedService::new();
        let mut orchestrator = Orchestrator::new(service);
        let mut record = IncidentRecord::new();
        let err = orchestrator.accept(&mut record).unwrap_err();
        assert!(matches!(err, AiError::Validation(_)));
    }

    #[test]
    fn accept_copies_fields_and_resets_the_session() {
        let final_draft = translated(enhanced_draft(&[]));
        let service = ScriptedService::new()
            .script_enhance(Ok(enhanced_draft(&[])))
            .script_translate(Ok(final_draft));
        let mut orchestrator = Orchestrator::new(service);
        orchestrator.start_enhancement(request()).expect("complete");

        let mut record = IncidentRecord::new();
        orchestrator.accept(&mut record).expect("accept");

        assert_eq!(record.date, "2024-03-01");
        assert_eq!(record.time, "10:30");
        assert_eq!(record.title.ja, "会議での怒鳴り");
        assert_eq!(orchestrator.state(), SessionState::Idle);
    }

    #[test]
    fn reply_without_pending_clarification_is_rejected() {
        let service = ScriptedService::new();
        let mut orchestrator = Orchestrator::new(service);
        let err = orchestrator.submit_reply("hello").unwrap_err();
        assert!(matches!(err, AiError::Validation(_)));
    }
}
