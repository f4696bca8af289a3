//! Assignment-table extraction profile.
//!
//! The assignment index page is a plain HTML table whose columns vary by
//! course language and term. Column resolution tries header keywords first
//! and falls back to positional heuristics; only the first table with usable
//! columns is processed.

use serde::Deserialize;
use tracing::debug;

use super::RawRecord;

/// One `<td>` as captured by [`super::scripts::TABLES_SCRIPT`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CellCapture {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub href: Option<String>,
    /// Text of the first link inside the cell, when present. Titles come
    /// from here, not from the whole cell, which may carry icons and
    /// accessibility suffixes.
    #[serde(default, rename = "linkText")]
    pub link_text: Option<String>,
}

/// One `<table>` as captured in the page.
#[derive(Debug, Clone, Deserialize)]
pub struct TableCapture {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<CellCapture>>,
}

/// Header keywords naming the assignment/activity title column.
const TITLE_KEYWORDS: &[&str] = &["과제", "assignment", "활동", "activity"];
/// Header keywords naming the due-date column.
const DUE_KEYWORDS: &[&str] = &["종료", "마감", "due"];
/// Header keywords naming the week column, anchor for the positional fallback.
const WEEK_KEYWORDS: &[&str] = &["주차", "week"];

fn header_matches(header: &str, keywords: &[&str]) -> bool {
    let lowered = header.to_lowercase();
    keywords.iter().any(|kw| lowered.contains(kw))
}

/// Resolves (title column, due column) for one table's headers.
///
/// Keyword matching wins when both columns are named. Otherwise, a week
/// column anchors the positional fallback: the title sits in the column
/// right after it and the due date in the third column.
#[must_use]
pub fn resolve_columns(headers: &[String]) -> Option<(usize, usize)> {
    let mut title_col = None;
    let mut due_col = None;
    for (i, header) in headers.iter().enumerate() {
        if title_col.is_none() && header_matches(header, TITLE_KEYWORDS) {
            title_col = Some(i);
        }
        if due_col.is_none() && header_matches(header, DUE_KEYWORDS) {
            due_col = Some(i);
        }
    }
    if let (Some(title), Some(due)) = (title_col, due_col) {
        return Some((title, due));
    }

    let week = headers.iter().position(|h| header_matches(h, WEEK_KEYWORDS))?;
    let title = week + 1;
    let due = 2;
    (headers.len() > title.max(due)).then_some((title, due))
}

/// Extracts raw assignment records from the captured tables.
///
/// Only the first table with resolvable columns is processed. Rows missing
/// either a linked title or a non-empty due text are skipped outright; an
/// assignment without a deadline is noise to a deadline tracker.
#[must_use]
pub fn parse_assignment_tables(tables: &[TableCapture]) -> Vec<RawRecord> {
    for table in tables {
        let Some((title_col, due_col)) = resolve_columns(&table.headers) else {
            continue;
        };

        let mut records = Vec::new();
        for row in &table.rows {
            if row.len() <= title_col.max(due_col) {
                continue;
            }
            let title_cell = &row[title_col];
            let due_text = row[due_col].text.trim();
            let Some(title) = title_cell.link_text.as_deref().map(str::trim) else {
                continue;
            };
            if title.is_empty() || due_text.is_empty() {
                continue;
            }
            records.push(RawRecord {
                title: title.to_string(),
                url: title_cell.href.clone(),
                due_text: Some(due_text.to_string()),
            });
        }
        debug!(rows = table.rows.len(), records = records.len(), "assignment table processed");
        return records;
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str) -> CellCapture {
        CellCapture {
            text: text.to_string(),
            ..CellCapture::default()
        }
    }

    fn linked_cell(link_text: &str, href: &str) -> CellCapture {
        CellCapture {
            text: format!("{link_text} link"),
            href: Some(href.to_string()),
            link_text: Some(link_text.to_string()),
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn keyword_headers_resolve_columns() {
        assert_eq!(resolve_columns(&headers(&["주차", "과제", "종료일시"])), Some((1, 2)));
        assert_eq!(
            resolve_columns(&headers(&["Week", "Assignment", "Due date", "Grade"])),
            Some((1, 2))
        );
        assert_eq!(resolve_columns(&headers(&["활동", "시작", "마감"])), Some((0, 2)));
    }

    #[test]
    fn positional_fallback_anchors_on_week_column() {
        // No title/due keywords at all, but a week column exists.
        assert_eq!(resolve_columns(&headers(&["주차", "이름", "일시"])), Some((1, 2)));
        assert_eq!(resolve_columns(&headers(&["Week", "Name", "Date"])), Some((1, 2)));
        // Week column present but the table is too narrow.
        assert_eq!(resolve_columns(&headers(&["주차", "이름"])), None);
    }

    #[test]
    fn unusable_headers_resolve_to_none() {
        assert_eq!(resolve_columns(&headers(&["이름", "성적", "비고"])), None);
        assert_eq!(resolve_columns(&[]), None);
    }

    #[test]
    fn first_usable_table_wins() {
        let decoy = TableCapture {
            headers: headers(&["이름", "성적"]),
            rows: vec![],
        };
        let real = TableCapture {
            headers: headers(&["주차", "과제", "종료일시"]),
            rows: vec![vec![
                cell("1주차"),
                linked_cell("HW1", "https://learn.inha.ac.kr/mod/assign/view.php?id=11"),
                cell("2025-09-25 00:00"),
            ]],
        };
        let ignored = TableCapture {
            headers: headers(&["주차", "과제", "종료일시"]),
            rows: vec![vec![
                cell("1주차"),
                linked_cell("other", "https://x/mod/assign/view.php?id=99"),
                cell("2025-10-01 00:00"),
            ]],
        };

        let records = parse_assignment_tables(&[decoy, real, ignored]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "HW1");
        assert_eq!(
            records[0].url.as_deref(),
            Some("https://learn.inha.ac.kr/mod/assign/view.php?id=11")
        );
        assert_eq!(records[0].due_text.as_deref(), Some("2025-09-25 00:00"));
    }

    #[test]
    fn rows_without_title_link_or_due_text_are_skipped() {
        let table = TableCapture {
            headers: headers(&["주차", "과제", "종료일시"]),
            rows: vec![
                // Title is plain text, not a link.
                vec![cell("1주차"), cell("읽기자료"), cell("2025-09-25 00:00")],
                // Due cell is empty.
                vec![cell("2주차"), linked_cell("HW2", "https://x/a?id=2"), cell("")],
                // Row shorter than the due column.
                vec![cell("3주차"), linked_cell("HW3", "https://x/a?id=3")],
                // Usable.
                vec![cell("4주차"), linked_cell("HW4", "https://x/a?id=4"), cell("2025-10-02 00:00")],
            ],
        };

        let records = parse_assignment_tables(&[table]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "HW4");
    }
}
