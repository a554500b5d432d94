//! Date and time recognition for free-text incident descriptions.
//!
//! Descriptions often carry the incident moment inline ("on 2024-03-01 at
//! 10:30"); these rules pull it out so the form starts pre-filled, falling
//! back to the current date and time when no pattern is present.
use chrono::Local;
use regex::Regex;

/// Date and time recognized from (or defaulted for) a raw description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedInfo {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`, 24-hour.
    pub time: String,
}

/// Recognize date and time in `raw`, defaulting to now for anything missing.
pub fn extract_incident_info(raw: &str) -> ExtractedInfo {
    let now = Local::now();
    let date = find_date(raw).unwrap_or_else(|| now.format("%Y-%m-%d").to_string());
    let time = find_time(raw).unwrap_or_else(|| now.format("%H:%M").to_string());
    ExtractedInfo { date, time }
}

fn find_date(raw: &str) -> Option<String> {
    let pattern = Regex::new(r"\b(20\d{2}[-/.]\d{1,2}[-/.]\d{1,2})\b")
        .expect("regex for inline dates");
    let matched = pattern.captures(raw)?.get(1)?.as_str();
    Some(normalize_date(matched))
}

fn find_time(raw: &str) -> Option<String> {
    let pattern = Regex::new(r"\b(\d{1,2}[:.]\d{2}(?:\s*(?i:AM|PM))?)\b")
        .expect("regex for inline times");
    let matched = pattern.captures(raw)?.get(1)?.as_str();
    Some(normalize_time(matched))
}

/// Normalize `YYYY[-/.]M[-/.]D` to `YYYY-MM-DD`.
fn normalize_date(raw: &str) -> String {
    let normalized = raw.replace(['/', '.'], "-");
    let mut parts = normalized.split('-');
    let year = parts.next().unwrap_or_default();
    let month = parts.next().unwrap_or_default();
    let day = parts.next().unwrap_or_default();
    format!("{year}-{month:0>2}-{day:0>2}")
}

/// Normalize a clock time, including 12-hour AM/PM forms, to 24-hour `HH:MM`.
fn normalize_time(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let is_pm = lower.ends_with("pm");
    let is_am = lower.ends_with("am");
    let bare = if is_pm || is_am {
        trimmed[..trimmed.len() - 2].trim()
    } else {
        trimmed
    };
    let bare = bare.replace('.', ":");
    let (hours_raw, minutes) = bare.split_once(':').unwrap_or((bare.as_str(), "00"));
    let mut hours: u32 = hours_raw.parse().unwrap_or(0);
    if is_pm && hours < 12 {
        hours += 12;
    } else if is_am && hours == 12 {
        hours = 0;
    }
    format!("{hours:02}:{minutes}")
}
