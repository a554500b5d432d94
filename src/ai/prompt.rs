//! Prompt assembly for the three service intents.
//!
//! Each prompt pins the reply to a single JSON object so the parser can stay
//! schema-driven. Instructions lead, content follows, and the required output
//! format is spelled out verbatim.
use crate::incident::IncidentDraft;
use crate::session::{ConversationTurn, Role};

pub(crate) const MAX_TOKENS: u32 = 4000;
pub(crate) const ENHANCE_TEMPERATURE: f64 = 0.3;
// Lower temperature for more precise incorporation and translation.
pub(crate) const FOLLOW_UP_TEMPERATURE: f64 = 0.2;
pub(crate) const TRANSLATE_TEMPERATURE: f64 = 0.2;

pub(crate) const ENHANCE_SYSTEM: &str = "You are a professional lawyer with years of experience in workplace harassment cases. Your expertise is in documenting incidents in a clear, factual, and legally sound manner. Your task is to extract and enhance incident descriptions to be professional, objective, and appropriate for legal documentation. Focus on observable behaviors and their impact, avoiding emotional language while still conveying the severity of the situation. Format all content in a structured way that clearly identifies the harassing behavior and why it constitutes workplace harassment under Japanese labor laws.";

pub(crate) const FOLLOW_UP_SYSTEM: &str = "You are a professional legal assistant specializing in workplace harassment documentation. Your task is to analyze user responses to follow-up questions and incorporate the new information into the incident documentation. Be thorough in identifying any remaining gaps in information that would be important for a complete legal record.";

pub(crate) const TRANSLATE_SYSTEM: &str = "You are a professional translator specializing in legal and workplace documentation. Your task is to translate workplace harassment incident details from English to Japanese, maintaining the professional and legal tone. Ensure the translation is accurate, culturally appropriate, and preserves all important details.";

/// User prompt for the initial enhancement of a raw description.
pub(crate) fn enhancement_prompt(draft: &IncidentDraft) -> String {
    let description = if draft.raw_input.is_empty() {
        draft.description.en.as_str()
    } else {
        draft.raw_input.as_str()
    };
    format!(
        "TASK: Analyze and enhance the following workplace harassment incident description to create a professional, factual, and legally sound document.\n\
\n\
REQUIRED OUTPUT FORMAT: Respond with a JSON object containing the following fields:\n\
- title: A clear, professional title for the incident\n\
- category: The most appropriate category (from: Physical Attack, Psychological Abuse, Excessive Work Demands, Isolation, Personal Intrusion, Verbal Abuse)\n\
- description: An enhanced, objective description focusing on observable behaviors\n\
- missingInfo: A list of any important missing information\n\
- suggestedEvidenceTypes: Relevant evidence types (from: image, document, audio, video)\n\
\n\
INCIDENT DETAILS:\n\
Date: {date}\n\
Time: {time}\n\
Raw Description: {description}\n\
\n\
GUIDELINES:\n\
1. Be objective and factual, avoiding emotional language\n\
2. Include all relevant details from the original description\n\
3. Structure the description chronologically\n\
4. Identify specific behaviors that constitute workplace harassment\n\
5. Note any missing information that would strengthen the documentation\n\
\n\
EXAMPLE OUTPUT FORMAT:\n\
{{\n\
  \"title\": {{ \"en\": \"Professional title here\" }},\n\
  \"category\": {{ \"en\": \"Selected category here\" }},\n\
  \"description\": {{ \"en\": \"Enhanced description here\" }},\n\
  \"missingInfo\": [\"List of missing information items\"],\n\
  \"suggestedEvidenceTypes\": [\"List of suggested evidence types\"]\n\
}}\n\
\n\
Respond ONLY with the JSON object, no additional text.",
        date = draft.date,
        time = draft.time,
        description = description,
    )
}

/// User prompt for folding clarification replies into the current draft.
pub(crate) fn follow_up_prompt(draft: &IncidentDraft, history: &[ConversationTurn]) -> String {
    let conversation = history
        .iter()
        .map(|turn| {
            let who = match turn.role {
                Role::Assistant => "AI",
                Role::User => "User",
            };
            format!("{who}: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    let missing_info = serde_json::to_string(&draft.missing_info).unwrap_or_default();
    let suggested = serde_json::to_string(&draft.suggested_evidence_types).unwrap_or_default();
    format!(
        "TASK: Analyze the user's responses to follow-up questions about a workplace harassment incident and update the incident documentation accordingly.\n\
\n\
CURRENT INCIDENT INFORMATION:\n\
Date: {date}\n\
Time: {time}\n\
Title: {title}\n\
Category: {category}\n\
Description: {description}\n\
Missing Information: {missing_info}\n\
Suggested Evidence Types: {suggested}\n\
\n\
RECENT CONVERSATION:\n\
{conversation}\n\
\n\
INSTRUCTIONS:\n\
1. Analyze the user's responses and extract any new information\n\
2. Update the incident details with this new information\n\
3. Identify any remaining important information that is still missing\n\
4. Provide a clear message acknowledging the user's response\n\
\n\
REQUIRED OUTPUT FORMAT:\n\
{{\n\
  \"updatedIncident\": {{\n\
    \"date\": \"YYYY-MM-DD\",\n\
    \"time\": \"HH:MM\",\n\
    \"title\": {{ \"en\": \"Updated title\" }},\n\
    \"category\": {{ \"en\": \"Updated category\" }},\n\
    \"description\": {{ \"en\": \"Updated description incorporating new information\" }},\n\
    \"missingInfo\": [\"Any remaining missing information items\"],\n\
    \"suggestedEvidenceTypes\": [\"Updated list of suggested evidence types\"]\n\
  }},\n\
  \"followUpQuestions\": [\"List of specific follow-up questions if any information is still missing\"],\n\
  \"aiMessage\": \"Message acknowledging user's response and explaining what was updated\"\n\
}}\n\
\n\
If there are no more follow-up questions needed, include an empty array for followUpQuestions.\n\
Respond ONLY with the JSON object, no additional text.",
        date = draft.date,
        time = draft.time,
        title = placeholder(&draft.title.en),
        category = placeholder(&draft.category.en),
        description = placeholder(&draft.description.en),
        missing_info = missing_info,
        suggested = suggested,
        conversation = conversation,
    )
}

/// User prompt for translating the finalized English content to Japanese.
pub(crate) fn translation_prompt(draft: &IncidentDraft) -> String {
    format!(
        "TASK: Translate the following workplace harassment incident details from English to Japanese.\n\
\n\
CONTENT TO TRANSLATE:\n\
Title: {title}\n\
Category: {category}\n\
Description: {description}\n\
\n\
INSTRUCTIONS:\n\
1. Maintain the professional and legal tone in the Japanese translation\n\
2. Ensure the translation is culturally appropriate for a Japanese workplace context\n\
3. Preserve all important details and the structure of the original text\n\
4. Use appropriate Japanese legal terminology for workplace harassment\n\
\n\
REQUIRED OUTPUT FORMAT:\n\
{{\n\
  \"title\": {{ \"ja\": \"Japanese title here\" }},\n\
  \"category\": {{ \"ja\": \"Japanese category here\" }},\n\
  \"description\": {{ \"ja\": \"Japanese description here\" }}\n\
}}\n\
\n\
Respond ONLY with the JSON object, no additional text.",
        title = placeholder(&draft.title.en),
        category = placeholder(&draft.category.en),
        description = placeholder(&draft.description.en),
    )
}

fn placeholder(text: &str) -> &str {
    if text.trim().is_empty() {
        "Not specified"
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::Bilingual;

    fn draft() -> IncidentDraft {
        IncidentDraft {
            date: "2024-03-01".to_string(),
            time: "10:30".to_string(),
            raw_input: "Manager shouted at me".to_string(),
            title: Bilingual::en("Shouting in meeting"),
            category: Bilingual::en("Verbal Abuse"),
            description: Bilingual::en("Manager shouted during the weekly meeting."),
            missing_info: vec!["location of incident".to_string()],
            ..IncidentDraft::default()
        }
    }

    #[test]
    fn enhancement_prompt_carries_date_time_and_raw_input() {
        let prompt = enhancement_prompt(&draft());
        assert!(prompt.contains("Date: 2024-03-01"));
        assert!(prompt.contains("Time: 10:30"));
        assert!(prompt.contains("Raw Description: Manager shouted at me"));
        assert!(prompt.contains("Respond ONLY with the JSON object"));
    }

    #[test]
    fn follow_up_prompt_renders_conversation_roles() {
        let history = vec![
            ConversationTurn {
                role: Role::Assistant,
                content: "Where did this happen?".to_string(),
            },
            ConversationTurn {
                role: Role::User,
                content: "In the third-floor meeting room.".to_string(),
            },
        ];
        let prompt = follow_up_prompt(&draft(), &history);
        assert!(prompt.contains("AI: Where did this happen?"));
        assert!(prompt.contains("User: In the third-floor meeting room."));
        assert!(prompt.contains("\"updatedIncident\""));
    }

    #[test]
    fn translation_prompt_falls_back_for_missing_fields() {
        let empty = IncidentDraft::default();
        let prompt = translation_prompt(&empty);
        assert!(prompt.contains("Title: Not specified"));
    }
}
