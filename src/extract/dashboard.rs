//! Dashboard fallback extraction profile.
//!
//! Only consulted under `CourseListPolicy::DashboardFallback`, when course
//! enumeration found nothing. The timeline/todo widgets carry far less
//! structure than the per-course pages, so records are classified by the
//! shape of their link instead of by which page they came from.

use serde::Deserialize;

use super::RawRecord;
use crate::model::ItemKind;

/// One timeline/todo widget entry as captured by
/// [`super::scripts::DASHBOARD_SCRIPT`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetCapture {
    pub title: String,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub due_text: Option<String>,
}

/// A classified dashboard record: the widgets mix assignments and lectures,
/// so the kind rides along with the raw triple.
#[derive(Debug, Clone)]
pub struct DashboardRecord {
    pub kind: ItemKind,
    pub course_name: String,
    pub record: RawRecord,
}

/// Assignment links go through `/mod/assign/`; everything else on the
/// dashboard is treated as a lecture.
#[must_use]
pub fn classify_link(url: Option<&str>) -> ItemKind {
    match url {
        Some(url) if url.contains("/mod/assign/") => ItemKind::Assignment,
        _ => ItemKind::Lecture,
    }
}

/// Converts widget captures into classified records. The widgets rarely name
/// the course, so missing course names become `"Unknown"`, matching what the
/// collector expects from degraded crawls.
#[must_use]
pub fn parse_dashboard_entries(entries: &[WidgetCapture]) -> Vec<DashboardRecord> {
    entries
        .iter()
        .filter_map(|entry| {
            let title = entry.title.trim();
            if title.is_empty() {
                return None;
            }
            Some(DashboardRecord {
                kind: classify_link(entry.url.as_deref()),
                course_name: entry
                    .course_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or("Unknown")
                    .to_string(),
                record: RawRecord {
                    title: title.to_string(),
                    url: entry.url.clone(),
                    due_text: entry.due_text.clone(),
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_links_classify_as_assignments() {
        assert_eq!(
            classify_link(Some("https://learn.inha.ac.kr/mod/assign/view.php?id=1")),
            ItemKind::Assignment
        );
        assert_eq!(
            classify_link(Some("https://learn.inha.ac.kr/mod/vod/view.php?id=2")),
            ItemKind::Lecture
        );
        assert_eq!(classify_link(None), ItemKind::Lecture);
    }

    #[test]
    fn missing_course_names_become_unknown() {
        let entries = [WidgetCapture {
            title: "3주차 과제".to_string(),
            course_name: None,
            url: Some("https://x/mod/assign/view.php?id=1".to_string()),
            due_text: Some("2025-09-25 00:00".to_string()),
        }];
        let records = parse_dashboard_entries(&entries);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].course_name, "Unknown");
        assert_eq!(records[0].kind, ItemKind::Assignment);
    }
}
