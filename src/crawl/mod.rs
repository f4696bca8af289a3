//! The crawl engine.
//!
//! [`LmsCrawler`] drives one sequential pass over the portal: login,
//! dashboard, course enumeration, then per-course assignment and lecture
//! extraction. Every await is bounded by a timeout and raced against the
//! cancellation token, so a wedged page can never hang the run.

pub mod cancel;
pub mod progress;
pub mod stage;

pub use cancel::CancelToken;
pub use progress::{NoOpProgress, ProgressReporter, ProgressUpdate, WatchProgress};
pub use stage::CrawlStage;

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::aggregate::Aggregator;
use crate::browser::PageDriver;
use crate::config::{CourseListPolicy, CrawlConfig};
use crate::error::CrawlError;
use crate::extract::{
    self, AnchorCapture, CourseLinkStrategy, TableCapture, scripts,
    videos::{OutlineCapture, VodCapture},
};
use crate::model::{Course, CrawlSnapshot};

/// Portal login credentials. The password never appears in debug output.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How often the manual-login flow re-checks the page URL.
const MANUAL_LOGIN_POLL_SECS: u64 = 2;

/// Sequential crawl engine over one [`PageDriver`].
#[derive(Debug)]
pub struct LmsCrawler<D, R = NoOpProgress> {
    driver: D,
    config: CrawlConfig,
    reporter: R,
    cancel: CancelToken,
}

impl<D: PageDriver> LmsCrawler<D> {
    #[must_use]
    pub fn new(driver: D, config: CrawlConfig) -> Self {
        Self {
            driver,
            config,
            reporter: NoOpProgress,
            cancel: CancelToken::new(),
        }
    }
}

impl<D: PageDriver, R: ProgressReporter> LmsCrawler<D, R> {
    /// Swaps in a progress reporter, keeping everything else.
    #[must_use]
    pub fn with_reporter<R2: ProgressReporter>(self, reporter: R2) -> LmsCrawler<D, R2> {
        LmsCrawler {
            driver: self.driver,
            config: self.config,
            reporter,
            cancel: self.cancel,
        }
    }

    /// Handle for cancelling this crawl from another task.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Runs a full crawl with automatic form login.
    pub async fn run(&self, credentials: &Credentials) -> Result<CrawlSnapshot, CrawlError> {
        self.login(credentials).await?;
        self.crawl_after_auth().await
    }

    /// Runs a full crawl assuming the user completes login by hand in a
    /// visible browser window. Waits, bounded, for the page to leave the
    /// login URL before crawling.
    pub async fn run_after_manual_login(&self) -> Result<CrawlSnapshot, CrawlError> {
        self.report(CrawlStage::LoginPageLoading, 10, None);
        self.navigate_and_settle(&self.config.login_url()).await?;
        self.report(CrawlStage::Authenticating, 20, None);
        self.wait_for_manual_login().await?;
        self.crawl_after_auth().await
    }

    // Stage plumbing.

    fn report(&self, stage: CrawlStage, percent: u8, detail: Option<&str>) {
        let mut update = ProgressUpdate::new(stage, percent);
        if let Some(detail) = detail {
            update = update.with_detail(detail);
        }
        self.reporter.report(update);
    }

    /// Races a driver future against the cancel token and a timeout. The
    /// inner driver error is handed back for the call site to classify.
    async fn guarded<T, F>(
        &self,
        what: &'static str,
        seconds: u64,
        fut: F,
    ) -> Result<anyhow::Result<T>, CrawlError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        tokio::select! {
            () = self.cancel.cancelled() => Err(CrawlError::Cancelled),
            outcome = tokio::time::timeout(Duration::from_secs(seconds), fut) => {
                outcome.map_err(|_| CrawlError::Timeout { what, seconds })
            }
        }
    }

    async fn pause(&self, seconds: u64) -> Result<(), CrawlError> {
        tokio::select! {
            () = self.cancel.cancelled() => Err(CrawlError::Cancelled),
            () = tokio::time::sleep(Duration::from_secs(seconds)) => Ok(()),
        }
    }

    /// Navigates, waits for load-complete, then pauses for the render delay
    /// so script-populated content exists before extraction. Returns the
    /// final URL.
    async fn navigate_and_settle(&self, url: &str) -> Result<String, CrawlError> {
        let timeout = self.config.page_load_timeout_secs;
        self.guarded("navigation", timeout, self.driver.navigate(url))
            .await?
            .map_err(|e| CrawlError::Navigation { url: url.to_string(), message: e.to_string() })?;
        let final_url = self
            .guarded("page load", timeout, self.driver.wait_until_loaded())
            .await?
            .map_err(|e| CrawlError::Navigation { url: url.to_string(), message: e.to_string() })?;
        self.pause(self.config.render_delay_secs).await?;
        Ok(final_url)
    }

    /// Runs a capture script and decodes its JSON result, retrying once on
    /// failure. Timeouts and cancellation are not retried.
    async fn script_capture<T: DeserializeOwned>(
        &self,
        what: &'static str,
        script: &str,
    ) -> Result<T, CrawlError> {
        let timeout = self.config.script_timeout_secs;
        let mut last_message = String::new();
        for attempt in 0..2 {
            if attempt > 0 {
                // Give late-rendering content another settle window before
                // the single retry.
                self.pause(self.config.render_delay_secs).await?;
            }
            match self.guarded(what, timeout, self.driver.run_script(script)).await? {
                Ok(value) => match serde_json::from_value::<T>(value) {
                    Ok(decoded) => return Ok(decoded),
                    Err(e) => {
                        last_message = format!("unexpected capture shape: {e}");
                        debug!(what, attempt, error = last_message.as_str(), "capture decode failed");
                    }
                },
                Err(e) => {
                    last_message = e.to_string();
                    debug!(what, attempt, error = last_message.as_str(), "capture script failed");
                }
            }
        }
        Err(CrawlError::Script { what, message: last_message })
    }

    // Pipeline stages.

    async fn login(&self, credentials: &Credentials) -> Result<(), CrawlError> {
        self.report(CrawlStage::LoginPageLoading, 10, None);
        self.navigate_and_settle(&self.config.login_url()).await?;

        self.report(CrawlStage::Authenticating, 20, None);
        let script = scripts::login_script(&credentials.username, &credentials.password);
        let submitted: bool = self.script_capture("login form submit", &script).await?;
        if !submitted {
            return Err(CrawlError::AuthenticationFailed("login form not found".to_string()));
        }

        let final_url = self
            .guarded(
                "post-login load",
                self.config.page_load_timeout_secs,
                self.driver.wait_until_loaded(),
            )
            .await?
            .map_err(|e| CrawlError::AuthenticationFailed(e.to_string()))?;
        self.pause(self.config.render_delay_secs).await?;

        if final_url.contains("/login") {
            return Err(CrawlError::AuthenticationFailed(
                "portal returned to the login page; check the credentials".to_string(),
            ));
        }
        info!("authenticated");
        Ok(())
    }

    async fn wait_for_manual_login(&self) -> Result<(), CrawlError> {
        let seconds = self.config.manual_login_timeout_secs;
        let deadline = tokio::time::Instant::now() + Duration::from_secs(seconds);
        loop {
            let url: String = self.script_capture("login poll", "location.href").await?;
            if !url.contains("/login") {
                info!("manual login completed");
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(CrawlError::Timeout { what: "manual login", seconds });
            }
            self.pause(MANUAL_LOGIN_POLL_SECS).await?;
        }
    }

    async fn crawl_after_auth(&self) -> Result<CrawlSnapshot, CrawlError> {
        self.report(CrawlStage::DashboardLoading, 40, None);
        self.navigate_and_settle(&self.config.dashboard_url()).await?;

        self.report(CrawlStage::CourseListExtracting, 50, None);
        let mut aggregator = Aggregator::new(&self.config);
        let courses = self.collect_courses().await?;

        if courses.is_empty() {
            match self.config.course_list_policy() {
                CourseListPolicy::Strict => return Err(CrawlError::NoCoursesFound),
                CourseListPolicy::DashboardFallback => {
                    warn!("no courses found, falling back to dashboard widgets");
                    let widgets: Vec<extract::WidgetCapture> = self
                        .script_capture("dashboard widgets", scripts::DASHBOARD_SCRIPT)
                        .await?;
                    aggregator.add_dashboard(&extract::parse_dashboard_entries(&widgets));
                    self.report(CrawlStage::Finalizing, 95, None);
                    let snapshot = aggregator.finish();
                    self.report(CrawlStage::Done, 100, None);
                    return Ok(snapshot);
                }
            }
        }

        let visit: Vec<Course> = match self.config.course_limit {
            Some(limit) => courses.iter().take(limit).cloned().collect(),
            None => courses.clone(),
        };
        for course in courses {
            aggregator.add_course(course);
        }

        let total = visit.len();
        for (index, course) in visit.iter().enumerate() {
            let percent = course_percent(index, total);
            self.visit_course(&mut aggregator, course, percent).await?;
        }

        self.report(CrawlStage::Finalizing, 95, None);
        let snapshot = aggregator.finish();
        info!(
            courses = snapshot.courses.len(),
            items = snapshot.items.len(),
            "crawl complete"
        );
        self.report(CrawlStage::Done, 100, None);
        Ok(snapshot)
    }

    /// Tries each course-link strategy in priority order, keeping the first
    /// one that captures at least one usable anchor.
    async fn collect_courses(&self) -> Result<Vec<Course>, CrawlError> {
        for strategy in CourseLinkStrategy::ORDERED {
            let script = scripts::course_links_script(strategy.selector());
            let anchors: Vec<AnchorCapture> =
                self.script_capture("course links", &script).await?;
            let courses = extract::dedupe_courses(&anchors);
            if !courses.is_empty() {
                debug!(strategy = strategy.name(), count = courses.len(), "course list found");
                return Ok(courses);
            }
        }
        Ok(Vec::new())
    }

    /// Like [`Self::script_capture`], but a script that fails both attempts
    /// contributes an empty capture instead of aborting the crawl. One
    /// broken course page must not cost the deadlines of every other
    /// course. Timeouts and cancellation still propagate.
    async fn course_capture<T: DeserializeOwned + Default>(
        &self,
        course: &Course,
        what: &'static str,
        script: &str,
    ) -> Result<T, CrawlError> {
        match self.script_capture(what, script).await {
            Ok(value) => Ok(value),
            Err(CrawlError::Script { what, message }) => {
                warn!(
                    course = course.name.as_str(),
                    what,
                    message = message.as_str(),
                    "extraction failed, contributing zero items for this page"
                );
                Ok(T::default())
            }
            Err(e) => Err(e),
        }
    }

    async fn visit_course(
        &self,
        aggregator: &mut Aggregator,
        course: &Course,
        percent: u8,
    ) -> Result<(), CrawlError> {
        self.report(CrawlStage::AssignmentLoading, percent, Some(&course.name));
        self.navigate_and_settle(&self.config.assignment_index_url(&course.id))
            .await?;
        self.report(CrawlStage::AssignmentExtracting, percent, Some(&course.name));
        let tables: Vec<TableCapture> = self
            .course_capture(course, "assignment tables", scripts::TABLES_SCRIPT)
            .await?;
        aggregator.add_assignments(&course.name, &extract::parse_assignment_tables(&tables));

        self.report(CrawlStage::VodLoading, percent, Some(&course.name));
        self.navigate_and_settle(&self.config.course_view_url(&course.id))
            .await?;
        self.report(CrawlStage::VodExtracting, percent, Some(&course.name));
        // Outline assignments go in ahead of the lectures so each course's
        // items stay assignments-first.
        let outline: Vec<OutlineCapture> = self
            .course_capture(course, "outline assignments", scripts::OUTLINE_ASSIGNMENTS_SCRIPT)
            .await?;
        aggregator.add_assignments(&course.name, &extract::parse_outline_assignments(&outline));
        let vods: Vec<VodCapture> = self
            .course_capture(course, "vod entries", scripts::VOD_LIST_SCRIPT)
            .await?;
        aggregator.add_lectures(&course.name, &extract::parse_vod_entries(&vods));
        Ok(())
    }
}

/// Per-course progress sits in the 60 to 90 band, spread evenly.
fn course_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 60;
    }
    let span = (index * 30) / total;
    60 + u8::try_from(span).unwrap_or(30)
}
