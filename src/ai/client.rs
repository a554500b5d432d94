//! Blocking HTTP client for the Groq chat-completions endpoint.
//!
//! One request shape serves all three intents; only the system instruction,
//! user prompt, and sampling temperature differ. The bearer credential is
//! supplied at construction and treated as an opaque string.
use super::{parse, prompt, AiError, AiService, FollowUpOutcome};
use crate::incident::IncidentDraft;
use crate::session::ConversationTurn;
use serde_json::{json, Value};
use std::time::Duration;

/// Default OpenAI-compatible chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

// Hung calls would otherwise block the session indefinitely.
const CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Stateless request/response wrapper around the text-generation endpoint.
pub struct GroqClient {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GroqClient {
    /// Build a client with the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(CALL_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .new_agent();
        GroqClient {
            agent,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Override the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Issue one chat completion and parse the reply content as JSON.
    fn complete(&self, system: &str, user: &str, temperature: f64) -> Result<Value, AiError> {
        if self.api_key.trim().is_empty() {
            return Err(AiError::Unauthenticated);
        }
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": temperature,
            "max_tokens": prompt::MAX_TOKENS,
        });
        let mut response = self
            .agent
            .post(self.endpoint.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send_json(&body)
            .map_err(|err| AiError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .body_mut()
                .read_json::<Value>()
                .ok()
                .and_then(|value| {
                    value
                        .get("error")
                        .and_then(|error| error.get("message"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("HTTP {status}"));
            tracing::warn!(%status, "chat completion rejected");
            return Err(AiError::Transport(detail));
        }
        let envelope: Value = response
            .body_mut()
            .read_json()
            .map_err(|err| AiError::Transport(err.to_string()))?;
        let content = envelope["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                AiError::MalformedReply("reply carries no message content".to_string())
            })?;
        parse::parse_reply_object(content)
    }
}

impl AiService for GroqClient {
    fn enhance(&self, draft: &IncidentDraft) -> Result<IncidentDraft, AiError> {
        tracing::info!(model = %self.model, "requesting incident enhancement");
        let user = prompt::enhancement_prompt(draft);
        let reply = self.complete(prompt::ENHANCE_SYSTEM, &user, prompt::ENHANCE_TEMPERATURE)?;
        Ok(parse::merge_enhancement(draft, &reply))
    }

    fn follow_up(
        &self,
        draft: &IncidentDraft,
        history: &[ConversationTurn],
    ) -> Result<FollowUpOutcome, AiError> {
        tracing::info!(turns = history.len(), "incorporating clarification replies");
        let user = prompt::follow_up_prompt(draft, history);
        let reply = self.complete(
            prompt::FOLLOW_UP_SYSTEM,
            &user,
            prompt::FOLLOW_UP_TEMPERATURE,
        )?;
        Ok(parse::merge_follow_up(draft, &reply))
    }

    fn translate(&self, draft: &IncidentDraft) -> Result<IncidentDraft, AiError> {
        tracing::info!("requesting Japanese translation");
        let user = prompt::translation_prompt(draft);
        let reply = self.complete(
            prompt::TRANSLATE_SYSTEM,
            &user,
            prompt::TRANSLATE_TEMPERATURE,
        )?;
        Ok(parse::merge_translation(draft, &reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_fails_before_any_request() {
        let client = GroqClient::new("");
        let err = client
            .complete("system", "user", 0.3)
            .expect_err("empty key must not reach the network");
        assert!(matches!(err, AiError::Unauthenticated));
    }
}
