//! Wire types shared between the crawl pipeline and the collector service.
//!
//! `CrawlSnapshot` is created fresh at the start of every crawl, mutated only
//! by the navigation controller and aggregator while the crawl runs, and then
//! handed immutably to the collector client. Nothing is cached across crawls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates;

/// One enrolled course, keyed by the numeric id embedded in its portal URL.
///
/// Uniqueness is enforced on `id`, never on `name`; the portal serves the
/// same logical course under cosmetically different names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    /// Numeric course id from the `id=` query parameter. Internal key only;
    /// the collector wire format carries `name` and `mainLink`.
    #[serde(skip_serializing)]
    pub id: String,
    pub name: String,
    #[serde(rename = "mainLink")]
    pub main_link: String,
}

/// Whether an item is a submittable assignment or a video lecture.
///
/// The collector calls lectures `"class"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(rename = "assignment")]
    Assignment,
    #[serde(rename = "class")]
    Lecture,
}

/// A single deadline-bearing item extracted from a course page.
///
/// Invariant: an `Assignment` always has `due = Some(..)`. Assignments whose
/// due date failed to normalize are dropped by the aggregator, never retained
/// with a null due date. Lectures may carry `due = None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub course_name: String,
    pub title: String,
    pub url: Option<String>,
    /// Canonical `YYYY-MM-DD HH:MM:SS` timestamp in the institution zone.
    pub due: Option<String>,
    /// Seconds until `due`, computed at submission time. `None` when the
    /// deadline has passed or the item has no due date.
    pub remaining_seconds: Option<i64>,
}

/// The complete result of one crawl, serialized as the collector's
/// `POST /api/crawl/submit/{accountId}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSnapshot {
    pub client_version: String,
    pub client_platform: String,
    /// ISO-8601 completion timestamp, set once when the crawl finalizes.
    pub crawled_at: String,
    /// Id-unique, in dashboard enumeration order.
    pub courses: Vec<Course>,
    /// Visitation order: assignments before lectures within each course,
    /// courses in enumeration order. Consumers sort by due date themselves.
    pub items: Vec<Item>,
}

impl CrawlSnapshot {
    /// Returns a copy with `remainingSeconds` recomputed against `now`.
    ///
    /// Called by the collector client immediately before serialization so the
    /// countdown reflects transmission time rather than extraction time.
    #[must_use]
    pub fn with_remaining_seconds(&self, now: DateTime<Utc>) -> Self {
        let mut snapshot = self.clone();
        for item in &mut snapshot.items {
            item.remaining_seconds = item
                .due
                .as_deref()
                .and_then(|due| dates::remaining_seconds(due, now));
        }
        snapshot
    }
}
