//! Deadline crawler for the Inha University learning portal.
//!
//! The crate drives a real browser through the portal's login, dashboard,
//! and course pages, extracts assignment and lecture deadlines, normalizes
//! their date formats, and submits the result to a collector service.
//!
//! The typical flow:
//!
//! ```no_run
//! use inhash_crawler::{
//!     CollectorClient, CrawlConfig, Credentials, LmsCrawler,
//!     browser::cdp::{self, CdpDriver},
//! };
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = CrawlConfig::default();
//! let (browser, handler) = cdp::launch_browser(config.headless()).await?;
//! let page = browser.new_page("about:blank").await?;
//!
//! let crawler = LmsCrawler::new(CdpDriver::new(page), config);
//! let credentials = Credentials {
//!     username: "student".to_string(),
//!     password: "secret".to_string(),
//! };
//! let snapshot = crawler.run(&credentials).await?;
//!
//! let collector = CollectorClient::new("https://collector.example.com", "token");
//! collector.submit("account-1", &snapshot).await?;
//!
//! drop(browser);
//! handler.abort();
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod browser;
pub mod collector;
pub mod config;
pub mod crawl;
pub mod dates;
pub mod error;
pub mod extract;
pub mod model;

pub use browser::PageDriver;
pub use collector::{CollectorClient, CollectorError, DeadlineEntry, DeadlineSheet};
pub use config::{CourseListPolicy, CrawlConfig};
pub use crawl::{
    CancelToken, CrawlStage, Credentials, LmsCrawler, NoOpProgress, ProgressReporter,
    ProgressUpdate, WatchProgress,
};
pub use error::CrawlError;
pub use model::{Course, CrawlSnapshot, Item, ItemKind};

/// Runs one full crawl over an already-constructed driver with automatic
/// login. Convenience wrapper for callers that do not need progress or
/// cancellation.
pub async fn crawl<D: PageDriver>(
    driver: D,
    config: CrawlConfig,
    credentials: &Credentials,
) -> Result<CrawlSnapshot, CrawlError> {
    LmsCrawler::new(driver, config).run(credentials).await
}
