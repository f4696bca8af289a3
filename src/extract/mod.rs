//! Page extraction profiles.
//!
//! Each page role (course list, assignment table, VOD list, dashboard) has a
//! profile: a capture script that runs in the page and returns structured
//! JSON, plus a pure Rust parsing stage. Keeping interpretation out of the
//! scripts means every profile is testable against fixture captures with no
//! browser in the loop.

pub mod assignments;
pub mod course_list;
pub mod dashboard;
pub mod scripts;
pub mod videos;

pub use assignments::{CellCapture, TableCapture, parse_assignment_tables};
pub use course_list::{AnchorCapture, CourseLinkStrategy, dedupe_courses};
pub use dashboard::{DashboardRecord, WidgetCapture, parse_dashboard_entries};
pub use videos::{OutlineCapture, VodCapture, parse_outline_assignments, parse_vod_entries};

/// A raw `(title, url, due-text)` triple produced by an extraction strategy,
/// before any date normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub title: String,
    pub url: Option<String>,
    pub due_text: Option<String>,
}
