//! Video/lecture extraction profile.
//!
//! Covers two sources on the course main page: VOD activity entries, whose
//! deadline is the end of a `start ~ end` viewing period, and assignment
//! activities embedded in the content outline, whose deadline only exists as
//! free text ("... 까지" / "until ...").

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::RawRecord;

/// One VOD activity as captured by [`super::scripts::VOD_LIST_SCRIPT`].
#[derive(Debug, Clone, Deserialize)]
pub struct VodCapture {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
}

/// One outline activity as captured by
/// [`super::scripts::OUTLINE_ASSIGNMENTS_SCRIPT`].
#[derive(Debug, Clone, Deserialize)]
pub struct OutlineCapture {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: String,
}

// Grabs the date text sitting before a 까지 ("until") marker, or after an
// English "until". The captured text is raw; normalization happens later.
static UNTIL_KO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d년월일시분.\s:-]*\d)\s*까지").unwrap());
static UNTIL_EN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)until\s+(\d[\d.\s:-]*\d)").unwrap());

/// Due text from a viewing-period field: the portion after the `~`
/// separator. `"2025.9.1 09:00 ~ 2025.9.28 23:59"` yields the end date.
#[must_use]
pub fn due_from_period(period: &str) -> Option<String> {
    let end = period.split('~').nth(1)?.trim();
    (!end.is_empty()).then(|| end.to_string())
}

/// Due text from an outline entry's free text, via the "until <date>"
/// phrasing in either language.
#[must_use]
pub fn due_from_until_text(text: &str) -> Option<String> {
    UNTIL_KO_RE
        .captures(text)
        .or_else(|| UNTIL_EN_RE.captures(text))
        .map(|caps| caps[1].trim().to_string())
}

/// Converts VOD captures into raw lecture records. Titles lose the trailing
/// `동영상` accessibility suffix the portal appends to every video link.
#[must_use]
pub fn parse_vod_entries(entries: &[VodCapture]) -> Vec<RawRecord> {
    entries
        .iter()
        .filter_map(|entry| {
            let title = entry.title.trim().trim_end_matches("동영상").trim();
            if title.is_empty() {
                return None;
            }
            Some(RawRecord {
                title: title.to_string(),
                url: entry.url.clone(),
                due_text: entry.period.as_deref().and_then(due_from_period),
            })
        })
        .collect()
}

/// Converts outline captures into raw assignment records. Entries whose free
/// text carries no until-phrase produce a record with no due text, which the
/// aggregator will then drop. Outline scanning never invents deadlines.
#[must_use]
pub fn parse_outline_assignments(entries: &[OutlineCapture]) -> Vec<RawRecord> {
    entries
        .iter()
        .filter_map(|entry| {
            let title = entry.title.trim();
            if title.is_empty() {
                return None;
            }
            Some(RawRecord {
                title: title.to_string(),
                url: entry.url.clone(),
                due_text: due_from_until_text(&entry.text),
            })
        })
        .collect()
}
