//! Crawl lifecycle stages.

use serde::{Deserialize, Serialize};

/// Where in the crawl pipeline a run currently is. Reported alongside a
/// percentage so front ends can show both a bar and a caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStage {
    Idle,
    LoginPageLoading,
    Authenticating,
    DashboardLoading,
    CourseListExtracting,
    AssignmentLoading,
    AssignmentExtracting,
    VodLoading,
    VodExtracting,
    Finalizing,
    Done,
}

impl CrawlStage {
    /// Human-readable caption for the stage.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Idle => "Waiting to start",
            Self::LoginPageLoading => "Opening the login page",
            Self::Authenticating => "Signing in",
            Self::DashboardLoading => "Loading the dashboard",
            Self::CourseListExtracting => "Reading the course list",
            Self::AssignmentLoading => "Opening assignment pages",
            Self::AssignmentExtracting => "Collecting assignments",
            Self::VodLoading => "Opening lecture pages",
            Self::VodExtracting => "Collecting lectures",
            Self::Finalizing => "Wrapping up",
            Self::Done => "Done",
        }
    }
}
