use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::config::ConnectorConfig;
use crate::activity::ActivityPage;
use crate::source::{ActivitySource, ListRequest};

/// HTTP client for the Admin SDK Reports API (`activities.list`).
///
/// Authenticates with a Bearer token supplied by the caller.
pub struct ReportsClient {
    access_token: String,
    http_client: Client,
    base_url: String,
}

impl ReportsClient {
    /// Create a client from connector config.
    pub fn from_config(access_token: String, config: &ConnectorConfig) -> Result<Self> {
        Self::with_base_url(
            access_token,
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Create a client with a custom base URL (for testing with a mock server).
    pub fn with_base_url(access_token: String, base_url: String, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent("reports-connector/0.1")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            access_token,
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one page of activities.
    pub async fn list_activities(&self, request: &ListRequest) -> Result<ActivityPage> {
        let url = format!(
            "{}/admin/reports/v1/activity/users/{}/applications/{}",
            self.base_url, request.user_key, request.application_name
        );
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&query_params(request))
            .send()
            .await
            .context("Failed to send activities.list request")?;

        check_response_status(&response)?;
        response
            .json::<ActivityPage>()
            .await
            .context("Failed to parse activities.list response")
    }
}

#[async_trait]
impl ActivitySource for ReportsClient {
    async fn list(&self, request: &ListRequest) -> Result<ActivityPage> {
        self.list_activities(request).await
    }
}

/// RFC3339 in UTC with millisecond precision, e.g. `2024-06-01T00:00:00.000Z`.
pub fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Query string for `activities.list`.
///
/// Filter expressions are joined with `,`, which the API treats as AND.
pub fn query_params(request: &ListRequest) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(start) = &request.start_time {
        params.push(("startTime", format_time(start)));
    }
    if let Some(end) = &request.end_time {
        params.push(("endTime", format_time(end)));
    }
    if !request.filters.is_empty() {
        params.push(("filters", request.filters.join(",")));
    }
    if let Some(max) = request.max_results {
        params.push(("maxResults", max.to_string()));
    }
    if let Some(token) = &request.page_token {
        params.push(("pageToken", token.clone()));
    }
    params
}

/// Check the response status and map known error codes to descriptive errors.
///
/// - 401 → auth error (token expired or invalid)
/// - 403 → missing admin privileges or scope
/// - 429 → quota exhausted
/// - Other non-2xx → generic API error
fn check_response_status(response: &reqwest::Response) -> Result<()> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(anyhow!("Reports API auth error: token expired or invalid")),
        StatusCode::FORBIDDEN => Err(anyhow!(
            "Reports API access denied: caller lacks admin reports privileges or scope"
        )),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            Err(anyhow!(
                "Reports API rate limit exceeded (Retry-After: {})",
                retry_after
            ))
        }
        s if !s.is_success() => Err(anyhow!("Reports API error: {}", s)),
        _ => Ok(()),
    }
}
