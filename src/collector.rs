//! HTTP client for the collector service.
//!
//! Two endpoints: snapshot submission and deadline retrieval. The server's
//! error body is a `{"success": false, "error": "..."}` envelope; anything
//! that fails to parse as that envelope is reported by status code alone.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::model::CrawlSnapshot;

/// Failure modes of collector calls.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The server answered with its error envelope.
    #[error("collector rejected the request: {0}")]
    ServerRejected(String),

    /// Non-success status with a body that is not the error envelope.
    #[error("collector returned status {0}")]
    ServerError(u16),

    /// Transport-level failure before any server answer.
    #[error("collector request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response whose body did not decode.
    #[error("collector response did not decode: {0}")]
    Decode(String),
}

/// One stored deadline, assignment or lecture.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineEntry {
    pub id: String,
    pub course_name: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_due_at")]
    pub due_at: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// The collector's stored view of one account's deadlines.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineSheet {
    #[serde(default)]
    pub assignments: Vec<DeadlineEntry>,
    #[serde(default)]
    pub lectures: Vec<DeadlineEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Client for one collector deployment.
#[derive(Debug, Clone)]
pub struct CollectorClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl CollectorClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_token: api_token.into(),
        }
    }

    /// Submits a crawl snapshot for `account_id`, restamping every item's
    /// countdown against the transmission time.
    pub async fn submit(
        &self,
        account_id: &str,
        snapshot: &CrawlSnapshot,
    ) -> Result<(), CollectorError> {
        let url = format!("{}/api/crawl/submit/{account_id}", self.base_url);
        let body = snapshot.with_remaining_seconds(Utc::now());
        debug!(url = url.as_str(), items = body.items.len(), "submitting snapshot");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 200 {
            info!(items = body.items.len(), "snapshot accepted");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(classify_failure(status.as_u16(), &text))
    }

    /// Fetches the deadlines the collector currently holds for `account_id`.
    pub async fn fetch_deadlines(&self, account_id: &str) -> Result<DeadlineSheet, CollectorError> {
        let url = format!("{}/api/deadlines/{account_id}", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &text));
        }

        response
            .json::<DeadlineSheet>()
            .await
            .map_err(|e| CollectorError::Decode(e.to_string()))
    }
}

fn classify_failure(status: u16, body: &str) -> CollectorError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.success => CollectorError::ServerRejected(
            envelope.error.unwrap_or_else(|| "unspecified error".to_string()),
        ),
        _ => CollectorError::ServerError(status),
    }
}

/// `dueAt` arrives as either an ISO-8601 string or epoch milliseconds,
/// depending on the collector version. Both normalize to the string form.
fn deserialize_due_at<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(i64),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Millis(ms) => chrono::DateTime::from_timestamp_millis(ms)
            .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
            .unwrap_or_else(|| ms.to_string()),
    }))
}
