//! Crawl configuration.
//!
//! A plain struct with working defaults for the Inha portal plus `with_*`
//! chainers for the handful of knobs callers actually turn.

use serde::{Deserialize, Serialize};

/// What to do when course enumeration comes back empty.
///
/// The shipped clients disagreed on this: one aborted, one fell back to
/// scraping the dashboard widgets. Both behaviors are kept, selectable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseListPolicy {
    /// Zero courses aborts the crawl with `CrawlError::NoCoursesFound`.
    /// A course-less result is considered worse than no result.
    #[default]
    Strict,
    /// Zero courses degrades to the dashboard timeline/todo widgets.
    DashboardFallback,
}

/// Main configuration for one crawl run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Portal origin, no trailing slash.
    pub(crate) portal_base_url: String,

    /// Year assumed for date strings that omit one (the portal drops the
    /// year on near-term dates).
    pub(crate) reference_year: i32,

    /// Seconds to let dynamically-populated content settle after a page
    /// reports loaded, before running extraction scripts.
    pub(crate) render_delay_secs: u64,

    /// Timeout in seconds for navigation + load-complete of a single page.
    pub(crate) page_load_timeout_secs: u64,

    /// Timeout in seconds for one in-page script evaluation.
    pub(crate) script_timeout_secs: u64,

    /// Upper bound in seconds on waiting for the user to finish a manual
    /// login before the crawl gives up.
    pub(crate) manual_login_timeout_secs: u64,

    pub(crate) course_list_policy: CourseListPolicy,

    /// Cap on courses visited per crawl. `None` visits everything.
    pub(crate) course_limit: Option<usize>,

    /// Run the browser headless. Only consulted by the chromiumoxide driver.
    pub(crate) headless: bool,

    pub(crate) client_version: String,
    pub(crate) client_platform: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            portal_base_url: "https://learn.inha.ac.kr".to_string(),
            reference_year: 2025,
            render_delay_secs: 2,
            page_load_timeout_secs: 30,
            script_timeout_secs: 10,
            manual_login_timeout_secs: 300,
            course_list_policy: CourseListPolicy::Strict,
            course_limit: None,
            headless: true,
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            client_platform: "rust".to_string(),
        }
    }
}

impl CrawlConfig {
    #[must_use]
    pub fn with_portal_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.portal_base_url = url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    #[must_use]
    pub fn with_render_delay_secs(mut self, secs: u64) -> Self {
        self.render_delay_secs = secs;
        self
    }

    #[must_use]
    pub fn with_page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.page_load_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_script_timeout_secs(mut self, secs: u64) -> Self {
        self.script_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_manual_login_timeout_secs(mut self, secs: u64) -> Self {
        self.manual_login_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_course_list_policy(mut self, policy: CourseListPolicy) -> Self {
        self.course_list_policy = policy;
        self
    }

    #[must_use]
    pub fn with_course_limit(mut self, limit: Option<usize>) -> Self {
        self.course_limit = limit;
        self
    }

    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn portal_base_url(&self) -> &str {
        &self.portal_base_url
    }

    #[must_use]
    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    #[must_use]
    pub fn course_list_policy(&self) -> CourseListPolicy {
        self.course_list_policy
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Login page of the portal.
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}/login/index.php", self.portal_base_url)
    }

    /// Dashboard (course-list) page.
    #[must_use]
    pub fn dashboard_url(&self) -> String {
        format!("{}/", self.portal_base_url)
    }

    /// Per-course assignment index page.
    #[must_use]
    pub fn assignment_index_url(&self, course_id: &str) -> String {
        format!("{}/mod/assign/index.php?id={course_id}", self.portal_base_url)
    }

    /// Per-course main page carrying the VOD list and content outline.
    #[must_use]
    pub fn course_view_url(&self, course_id: &str) -> String {
        format!("{}/course/view.php?id={course_id}", self.portal_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_inha_portal() {
        let config = CrawlConfig::default();
        assert_eq!(config.login_url(), "https://learn.inha.ac.kr/login/index.php");
        assert_eq!(
            config.assignment_index_url("64609"),
            "https://learn.inha.ac.kr/mod/assign/index.php?id=64609"
        );
        assert_eq!(config.course_list_policy(), CourseListPolicy::Strict);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let config = CrawlConfig::default().with_portal_base_url("https://lms.example.edu/");
        assert_eq!(config.course_view_url("7"), "https://lms.example.edu/course/view.php?id=7");
    }
}
