use crate::activity::ActivityPage;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Parameters of one page request against the activity source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRequest {
    /// Whose activities to list (`all` for every user).
    pub user_key: String,
    /// Report application, e.g. `login`.
    pub application_name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Server-side filter expressions, all of which must match.
    pub filters: Vec<String>,
    pub max_results: Option<u64>,
    pub page_token: Option<String>,
}

impl ListRequest {
    pub fn new(user_key: impl Into<String>, application_name: impl Into<String>) -> Self {
        Self {
            user_key: user_key.into(),
            application_name: application_name.into(),
            start_time: None,
            end_time: None,
            filters: Vec::new(),
            max_results: None,
            page_token: None,
        }
    }
}

/// Remote source of activity records.
///
/// Implementations perform exactly one remote call per `list` and never
/// retry; pagination is driven by the caller through `page_token`.
///
/// # Example
/// ```no_run
/// use anyhow::Result;
/// use async_trait::async_trait;
/// use reports_connector::{ActivityPage, ActivitySource, ListRequest};
///
/// struct EmptySource;
///
/// #[async_trait]
/// impl ActivitySource for EmptySource {
///     async fn list(&self, _request: &ListRequest) -> Result<ActivityPage> {
///         Ok(ActivityPage::default())
///     }
/// }
/// ```
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Fetches one page of activities.
    async fn list(&self, request: &ListRequest) -> Result<ActivityPage>;
}
