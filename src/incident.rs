//! Bilingual incident record types shared across the enhancement workflow.
//!
//! These types mirror the JSON shapes exchanged with the AI service so the
//! orchestrator stays schema-driven instead of passing loose maps around.
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An English/Japanese text pair. The `ja` side stays empty until translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub ja: String,
}

impl Bilingual {
    /// Build a pair with only the English side populated.
    pub fn en(text: impl Into<String>) -> Self {
        Bilingual {
            en: text.into(),
            ja: String::new(),
        }
    }
}

/// Closed harassment-category vocabulary used by the documentation forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    PhysicalAttack,
    PsychologicalAbuse,
    ExcessiveWorkDemands,
    Isolation,
    PersonalIntrusion,
    VerbalAbuse,
}

impl Category {
    /// Every category, in form display order.
    pub const ALL: [Category; 6] = [
        Category::PhysicalAttack,
        Category::PsychologicalAbuse,
        Category::ExcessiveWorkDemands,
        Category::Isolation,
        Category::PersonalIntrusion,
        Category::VerbalAbuse,
    ];

    /// Return the stable key used in record JSON.
    pub fn key(&self) -> &'static str {
        match self {
            Category::PhysicalAttack => "physicalAttack",
            Category::PsychologicalAbuse => "psychologicalAbuse",
            Category::ExcessiveWorkDemands => "excessiveWorkDemands",
            Category::Isolation => "isolation",
            Category::PersonalIntrusion => "personalIntrusion",
            Category::VerbalAbuse => "verbalAbuse",
        }
    }

    /// English display label.
    pub fn label_en(&self) -> &'static str {
        match self {
            Category::PhysicalAttack => "Physical Attack",
            Category::PsychologicalAbuse => "Psychological Abuse",
            Category::ExcessiveWorkDemands => "Excessive Work Demands",
            Category::Isolation => "Isolation",
            Category::PersonalIntrusion => "Personal Intrusion",
            Category::VerbalAbuse => "Verbal Abuse",
        }
    }

    /// Japanese display label.
    pub fn label_ja(&self) -> &'static str {
        match self {
            Category::PhysicalAttack => "身体的攻撃",
            Category::PsychologicalAbuse => "精神的な嫌がらせ",
            Category::ExcessiveWorkDemands => "過大な要求",
            Category::Isolation => "人間関係からの切り離し",
            Category::PersonalIntrusion => "個の侵害",
            Category::VerbalAbuse => "言葉による暴力",
        }
    }

    /// Resolve a free-text label to the closed set.
    ///
    /// Unrecognized labels fall back to verbal abuse, matching the form's
    /// default selection.
    pub fn from_label(label: &str) -> Category {
        let wanted = label.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.label_en().eq_ignore_ascii_case(wanted))
            .unwrap_or(Category::VerbalAbuse)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Closed evidence-kind vocabulary for suggested attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Image,
    Document,
    Audio,
    Video,
}

impl EvidenceKind {
    /// Every evidence kind, in form display order.
    pub const ALL: [EvidenceKind; 4] = [
        EvidenceKind::Image,
        EvidenceKind::Document,
        EvidenceKind::Audio,
        EvidenceKind::Video,
    ];

    /// Return the stable string identifier used in record JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceKind::Image => "image",
            EvidenceKind::Document => "document",
            EvidenceKind::Audio => "audio",
            EvidenceKind::Video => "video",
        }
    }

    /// File extension assumed when no original filename is known.
    pub fn default_extension(&self) -> &'static str {
        match self {
            EvidenceKind::Image => "jpg",
            EvidenceKind::Document => "pdf",
            EvidenceKind::Audio => "mp3",
            EvidenceKind::Video => "mp4",
        }
    }

    /// Parse a service-provided kind string; unknown kinds are dropped.
    pub fn parse(raw: &str) -> Option<EvidenceKind> {
        let wanted = raw.trim().to_ascii_lowercase();
        EvidenceKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The working record being enhanced across conversation rounds.
///
/// `date` and `time` come from the original request (or extraction) and are
/// never overwritten by later service replies. The `ja` sides of the bilingual
/// fields are populated only by the translation step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDraft {
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub raw_input: String,
    #[serde(default)]
    pub title: Bilingual,
    #[serde(default)]
    pub category: Bilingual,
    #[serde(default)]
    pub description: Bilingual,
    #[serde(default)]
    pub missing_info: Vec<String>,
    #[serde(default)]
    pub suggested_evidence_types: Vec<EvidenceKind>,
}

/// One evidence attachment row on the caller's record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRow {
    pub kind: Option<EvidenceKind>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub description: Bilingual,
}

impl EvidenceRow {
    /// A row the user has not touched yet; eligible for replacement by an
    /// evidence-type suggestion.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.filename.is_empty()
    }
}

/// The caller's target record, populated when an enhancement is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    pub id: String,
    pub date: String,
    pub time: String,
    pub title: Bilingual,
    pub category: Category,
    pub description: Bilingual,
    pub evidence: Vec<EvidenceRow>,
}

impl IncidentRecord {
    /// Fresh record with one empty evidence row, like a blank entry form.
    pub fn new() -> Self {
        IncidentRecord {
            id: format!("inc_{}", Uuid::new_v4().simple()),
            date: String::new(),
            time: String::new(),
            title: Bilingual::default(),
            category: Category::VerbalAbuse,
            description: Bilingual::default(),
            evidence: vec![EvidenceRow::default()],
        }
    }

    /// Copy a finalized draft into this record and propose evidence rows.
    ///
    /// The first suggested kind fills the single untouched row when that is
    /// all the record has; remaining kinds append new rows. Records the user
    /// already attached evidence to are left alone.
    pub fn apply_enhancement(&mut self, draft: &IncidentDraft) {
        self.date = draft.date.clone();
        self.time = draft.time.clone();
        self.title = draft.title.clone();
        self.category = Category::from_label(&draft.category.en);
        self.description = draft.description.clone();

        if draft.suggested_evidence_types.is_empty() {
            return;
        }
        if self.evidence.len() != 1 || !self.evidence[0].is_empty() {
            return;
        }
        let mut kinds = draft.suggested_evidence_types.iter().copied();
        if let Some(first) = kinds.next() {
            self.evidence[0].kind = Some(first);
            self.evidence[0].filename =
                suggest_evidence_filename(&self.date, &self.title.en, first, None);
        }
        for kind in kinds {
            let filename = suggest_evidence_filename(&self.date, &self.title.en, kind, None);
            self.evidence.push(EvidenceRow {
                kind: Some(kind),
                filename,
                description: Bilingual::default(),
            });
        }
    }
}

impl Default for IncidentRecord {
    fn default() -> Self {
        IncidentRecord::new()
    }
}

/// Suggest a filename for an evidence attachment from the incident details.
///
/// Shape: `YYYYMMDD_<first-three-title-words>_<kind>.<ext>`, with the
/// extension taken from the original filename when one is known.
pub fn suggest_evidence_filename(
    date: &str,
    title_en: &str,
    kind: EvidenceKind,
    original_filename: Option<&str>,
) -> String {
    let date_part: String = date.chars().filter(|ch| *ch != '-').collect();
    let title = if title_en.trim().is_empty() {
        "incident"
    } else {
        title_en
    };
    let short_title = title
        .split_whitespace()
        .take(3)
        .map(|word| {
            word.chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .collect::<Vec<_>>()
        .join("_");
    let extension = original_filename
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_string()))
        .unwrap_or_else(|| kind.default_extension().to_string());
    format!("{date_part}_{short_title}_{kind}.{extension}")
}
