//! Error taxonomy for crawl operations.
//!
//! Every failure surfaces exactly once, as the `Err` arm of the single
//! awaited crawl task. Per-course extraction coming back empty is *not* an
//! error; the crawl records zero items for that course and moves on.

use thiserror::Error;

/// Failure modes of a crawl run.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A page load failed outright. Never retried.
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// The login form was missing, or the portal bounced us back to the
    /// login page after submitting credentials. Never retried.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Course enumeration found nothing under the `Strict` policy. A
    /// course-less crawl cannot locate assignments reliably, so this aborts
    /// the whole run rather than degrading silently.
    #[error("no courses found on the dashboard")]
    NoCoursesFound,

    /// A bounded page or script await expired.
    #[error("{what} timed out after {seconds}s")]
    Timeout { what: &'static str, seconds: u64 },

    /// An in-page extraction script failed twice (initial attempt plus the
    /// single retry).
    #[error("extraction script failed: {message}")]
    Script { what: &'static str, message: String },

    /// The cancellation token fired; the session was released mid-crawl.
    #[error("crawl cancelled")]
    Cancelled,
}
