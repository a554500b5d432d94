//! Structured-reply parsing and field merging.
//!
//! The service is asked for a bare JSON object but does not always comply:
//! replies may be wrapped in code fences or prose. Parsing first tries the
//! whole text, then the first parseable top-level object inside it. Merging
//! never fully trusts the reply: fields the caller already knows to be
//! reliable are kept from the request side.
use super::{AiError, FollowUpOutcome};
use crate::incident::{Bilingual, Category, EvidenceKind, IncidentDraft};
use serde::Deserialize;
use serde_json::Value;

/// Parse the reply text into a JSON object, tolerating surrounding prose.
pub(crate) fn parse_reply_object(content: &str) -> Result<Value, AiError> {
    let cleaned = strip_code_fences(content);
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        if value.is_object() {
            return Ok(value);
        }
    }
    first_object_in_text(&cleaned)
        .ok_or_else(|| AiError::MalformedReply("no JSON object found in reply".to_string()))
}

fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let mut lines: Vec<&str> = trimmed.lines().collect();
    if let Some(first) = lines.first() {
        if first.trim_start().starts_with("```") {
            lines.remove(0);
        }
    }
    if let Some(last) = lines.last() {
        if last.trim_start().starts_with("```") {
            lines.pop();
        }
    }
    lines.join("\n").trim().to_string()
}

fn first_object_in_text(raw: &str) -> Option<Value> {
    for (idx, ch) in raw.char_indices() {
        if ch != '{' {
            continue;
        }
        let mut deserializer = serde_json::Deserializer::from_str(&raw[idx..]);
        if let Ok(value) = Value::deserialize(&mut deserializer) {
            if value.is_object() {
                return Some(value);
            }
        }
    }
    None
}

/// Merge an enhancement reply into the request draft.
///
/// `date` and `time` are always kept from the request; content fields come
/// from the reply with safe fallbacks when absent.
pub(crate) fn merge_enhancement(request: &IncidentDraft, reply: &Value) -> IncidentDraft {
    let mut draft = request.clone();
    draft.title = Bilingual::en(lang_text(reply, "title", "en").unwrap_or_default());
    draft.category = Bilingual::en(
        lang_text(reply, "category", "en")
            .unwrap_or_else(|| Category::VerbalAbuse.label_en().to_string()),
    );
    draft.description = Bilingual::en(
        lang_text(reply, "description", "en").unwrap_or_else(|| fallback_description(request)),
    );
    draft.missing_info = string_list(reply, "missingInfo").unwrap_or_default();
    draft.suggested_evidence_types =
        evidence_kinds(reply, "suggestedEvidenceTypes").unwrap_or_default();
    draft
}

/// Merge a follow-up reply into the incoming draft.
///
/// The reply's `updatedIncident` supplies content fields only; anything it
/// omits keeps the incoming draft's value, and `date`/`time` are never taken
/// from the reply at all.
pub(crate) fn merge_follow_up(request: &IncidentDraft, reply: &Value) -> FollowUpOutcome {
    let mut updated = request.clone();
    if let Some(incident) = reply.get("updatedIncident") {
        if let Some(title) = lang_text(incident, "title", "en") {
            updated.title.en = title;
        }
        if let Some(category) = lang_text(incident, "category", "en") {
            updated.category.en = category;
        }
        if let Some(description) = lang_text(incident, "description", "en") {
            updated.description.en = description;
        }
        if let Some(items) = string_list(incident, "missingInfo") {
            updated.missing_info = items;
        }
        if let Some(kinds) = evidence_kinds(incident, "suggestedEvidenceTypes") {
            updated.suggested_evidence_types = kinds;
        }
    }
    FollowUpOutcome {
        updated_incident: updated,
        follow_up_questions: string_list(reply, "followUpQuestions").unwrap_or_default(),
        ai_message: reply
            .get("aiMessage")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Merge a translation reply into the finalized draft.
///
/// The English side is kept from the input; only `ja` fields are consumed,
/// with the category falling back to its own Japanese label.
pub(crate) fn merge_translation(request: &IncidentDraft, reply: &Value) -> IncidentDraft {
    let mut draft = request.clone();
    draft.title.ja = lang_text(reply, "title", "ja").unwrap_or_default();
    draft.category.ja = lang_text(reply, "category", "ja")
        .unwrap_or_else(|| Category::from_label(&request.category.en).label_ja().to_string());
    draft.description.ja = lang_text(reply, "description", "ja").unwrap_or_default();
    draft
}

fn fallback_description(request: &IncidentDraft) -> String {
    if request.raw_input.is_empty() {
        request.description.en.clone()
    } else {
        request.raw_input.clone()
    }
}

fn lang_text(value: &Value, field: &str, lang: &str) -> Option<String> {
    value
        .get(field)?
        .get(lang)?
        .as_str()
        .map(str::to_string)
}

fn string_list(value: &Value, field: &str) -> Option<Vec<String>> {
    let items = value.get(field)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
    )
}

fn evidence_kinds(value: &Value, field: &str) -> Option<Vec<EvidenceKind>> {
    let items = string_list(value, field)?;
    Some(
        items
            .iter()
            .filter_map(|item| EvidenceKind::parse(item))
            .collect(),
    )
}
