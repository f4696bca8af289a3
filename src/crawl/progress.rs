//! Progress reporting for crawl runs.
//!
//! The engine pushes [`ProgressUpdate`]s through a [`ProgressReporter`];
//! callers that do not care use [`NoOpProgress`], UI callers use
//! [`WatchProgress`] and subscribe to its channel.

use tokio::sync::watch;

use super::stage::CrawlStage;

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub stage: CrawlStage,
    /// 0 to 100, monotone over a run.
    pub percent: u8,
    /// Stage-specific detail, like the course currently being visited.
    pub detail: Option<String>,
}

impl ProgressUpdate {
    #[must_use]
    pub fn new(stage: CrawlStage, percent: u8) -> Self {
        Self { stage, percent, detail: None }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Receives progress updates from a running crawl.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Reporter that discards everything. The compiler erases it entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report(&self, _update: ProgressUpdate) {}
}

/// Reporter backed by a `tokio::sync::watch` channel. Late subscribers see
/// the latest update immediately; intermediate updates may be skipped, which
/// is the right semantics for a progress bar.
#[derive(Debug)]
pub struct WatchProgress {
    tx: watch::Sender<ProgressUpdate>,
}

impl WatchProgress {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressUpdate::new(CrawlStage::Idle, 0));
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProgressUpdate> {
        self.tx.subscribe()
    }
}

impl Default for WatchProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for WatchProgress {
    fn report(&self, update: ProgressUpdate) {
        // Send only fails with no receivers, which is fine for progress.
        let _ = self.tx.send(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_subscribers_see_the_latest_update() {
        let progress = WatchProgress::new();
        progress.report(ProgressUpdate::new(CrawlStage::Authenticating, 20));
        progress.report(
            ProgressUpdate::new(CrawlStage::AssignmentLoading, 65).with_detail("OOP[XX-1]"),
        );

        let rx = progress.subscribe();
        let latest = rx.borrow();
        assert_eq!(latest.stage, CrawlStage::AssignmentLoading);
        assert_eq!(latest.percent, 65);
        assert_eq!(latest.detail.as_deref(), Some("OOP[XX-1]"));
    }

    #[test]
    fn noop_reporter_accepts_updates() {
        NoOpProgress.report(ProgressUpdate::new(CrawlStage::Done, 100));
    }
}
