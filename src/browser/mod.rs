//! Browser abstraction.
//!
//! The crawl engine never talks to chromiumoxide directly; it goes through
//! [`PageDriver`], which is small enough to fake in tests with a scripted
//! page model. The real implementation lives in [`cdp`].

pub mod cdp;

use std::future::Future;

use anyhow::Result;

/// The three page capabilities the crawl engine needs.
pub trait PageDriver: Send + Sync {
    /// Starts navigation to `url`. Returns once the navigation is issued,
    /// not once the page is loaded.
    fn navigate(&self, url: &str) -> impl Future<Output = Result<()>> + Send;

    /// Waits for the current navigation to reach load-complete and returns
    /// the final URL, after any redirects.
    fn wait_until_loaded(&self) -> impl Future<Output = Result<String>> + Send;

    /// Evaluates a script in the page and returns its JSON result.
    fn run_script(&self, script: &str) -> impl Future<Output = Result<serde_json::Value>> + Send;
}
