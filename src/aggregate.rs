//! Crawl result aggregation.
//!
//! The aggregator owns the accumulating [`CrawlSnapshot`] for the duration
//! of one crawl. It enforces the two product invariants: courses are
//! id-unique, and an assignment whose due date did not normalize is dropped
//! rather than kept with a null deadline. Items are appended strictly in
//! visitation order; sorting is the consumer's job.

use std::collections::HashSet;

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::CrawlConfig;
use crate::dates;
use crate::extract::{DashboardRecord, RawRecord};
use crate::model::{Course, CrawlSnapshot, Item, ItemKind};

// Cosmetic delivery-mode prefixes the portal prepends to course names:
// a department token ("A학부 ...") or a bracketed delivery marker
// ("[비대면] ..."). Stripped so the same logical course unifies across
// listings. Applied repeatedly since the two can stack.
static COURSE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\[(?:비대면|대면|혼합)\]|\S*학부)\s+").unwrap());

/// Removes delivery-mode prefixes from a course name.
#[must_use]
pub fn strip_course_prefix(name: &str) -> String {
    let mut current = name.trim();
    loop {
        match COURSE_PREFIX_RE.find(current) {
            Some(m) => current = current[m.end()..].trim_start(),
            None => return current.to_string(),
        }
    }
}

/// Accumulates per-course extraction output into the final snapshot.
#[derive(Debug)]
pub struct Aggregator {
    reference_year: i32,
    client_version: String,
    client_platform: String,
    courses: Vec<Course>,
    seen_course_ids: HashSet<String>,
    items: Vec<Item>,
}

impl Aggregator {
    #[must_use]
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            reference_year: config.reference_year,
            client_version: config.client_version.clone(),
            client_platform: config.client_platform.clone(),
            courses: Vec::new(),
            seen_course_ids: HashSet::new(),
            items: Vec::new(),
        }
    }

    /// Records a course, keeping the first occurrence per id. Course names
    /// are prefix-stripped here so the snapshot and its items agree. Returns
    /// whether the course was new.
    pub fn add_course(&mut self, mut course: Course) -> bool {
        if !self.seen_course_ids.insert(course.id.clone()) {
            return false;
        }
        course.name = strip_course_prefix(&course.name);
        self.courses.push(course);
        true
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Appends assignment records for one course. Records whose due text is
    /// absent or unparseable are dropped entirely.
    pub fn add_assignments(&mut self, course_name: &str, records: &[RawRecord]) {
        let course_name = strip_course_prefix(course_name);
        for record in records {
            let Some(due) = record
                .due_text
                .as_deref()
                .and_then(|raw| dates::normalize(raw, self.reference_year))
            else {
                debug!(title = record.title.as_str(), "dropping assignment without a resolvable due date");
                continue;
            };
            self.items.push(Item {
                kind: ItemKind::Assignment,
                course_name: course_name.clone(),
                title: record.title.clone(),
                url: record.url.clone(),
                due: Some(due),
                remaining_seconds: None,
            });
        }
    }

    /// Appends lecture records for one course. Lectures survive an
    /// unparseable period; they just carry no due date.
    pub fn add_lectures(&mut self, course_name: &str, records: &[RawRecord]) {
        let course_name = strip_course_prefix(course_name);
        for record in records {
            let due = record
                .due_text
                .as_deref()
                .and_then(|raw| dates::normalize(raw, self.reference_year));
            self.items.push(Item {
                kind: ItemKind::Lecture,
                course_name: course_name.clone(),
                title: record.title.clone(),
                url: record.url.clone(),
                due,
                remaining_seconds: None,
            });
        }
    }

    /// Appends classified dashboard records, applying the same
    /// assignment-drop / lecture-keep rule as the per-course paths.
    pub fn add_dashboard(&mut self, records: &[DashboardRecord]) {
        for entry in records {
            match entry.kind {
                ItemKind::Assignment => {
                    self.add_assignments(&entry.course_name, std::slice::from_ref(&entry.record));
                }
                ItemKind::Lecture => {
                    self.add_lectures(&entry.course_name, std::slice::from_ref(&entry.record));
                }
            }
        }
    }

    /// Seals the accumulator into the final snapshot, stamping the crawl
    /// completion time.
    #[must_use]
    pub fn finish(self) -> CrawlSnapshot {
        CrawlSnapshot {
            client_version: self.client_version,
            client_platform: self.client_platform,
            crawled_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            courses: self.courses,
            items: self.items,
        }
    }
}
