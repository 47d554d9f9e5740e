//! Bounded paginated list fetch.
//!
//! Pages through `activities.list` one request at a time and yields records
//! as they arrive. Two budgets bound the output: an absolute cap on records
//! per invocation and the host's optional row limit. Each page asks for no
//! more than either budget still allows.
//!
//! ```text
//!   quals ──► TimeWindow + filters ──► ListRequest
//!                                         │
//!        ┌────────────────────────────────┘
//!        ▼
//!   list(page_size, page_token) ──► yield items one by one
//!        ▲                                 │ cap or row limit reached → end
//!        └──── next_page_token ◄───────────┘ no token → end
//! ```

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, Stream};
use std::sync::Arc;
use tracing::{debug, error};

use super::config::{ConnectorConfig, APPLICATION_NAME};
use super::quals::{LoginActivityQuals, TimeWindow};
use crate::activity::Activity;
use crate::source::{ActivitySource, ListRequest};

/// Operation tag attached to list failures in logs.
pub const LIST_OPERATION: &str = "gcp_admin_reports_login_activity.list";

/// Why a fetch stopped before the source ran out of pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The absolute per-invocation cap was reached.
    ResultCap,
    /// The host's row limit was reached.
    RowLimit,
}

/// Record budget of one fetch invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageBudget {
    max_total: u64,
    row_limit: Option<u64>,
    page_max: u64,
    emitted: u64,
}

impl PageBudget {
    pub fn new(max_total: u64, row_limit: Option<u64>, page_max: u64) -> Self {
        Self {
            max_total,
            row_limit,
            page_max,
            emitted: 0,
        }
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Counts one yielded record.
    pub fn record(&mut self) {
        self.emitted += 1;
    }

    /// Cap first, then row limit.
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.emitted >= self.max_total {
            Some(StopReason::ResultCap)
        } else if self.row_limit.is_some_and(|limit| self.emitted >= limit) {
            Some(StopReason::RowLimit)
        } else {
            None
        }
    }

    /// Size of the next page request, `None` when nothing more may be emitted.
    ///
    /// `min(cap - emitted, row_limit - emitted, page_max)`.
    pub fn next_page_size(&self) -> Option<u64> {
        let until_cap = self.max_total.saturating_sub(self.emitted);
        let until_limit = self
            .row_limit
            .map_or(until_cap, |limit| limit.saturating_sub(self.emitted));
        let size = until_cap.min(until_limit).min(self.page_max);
        (size > 0).then_some(size)
    }
}

/// Builds the first page request, or `None` when the time window is empty.
///
/// A lookback too large for chrono also yields an empty window;
/// [`ConnectorConfig::validate`] rejects such values.
pub fn initial_request(
    config: &ConnectorConfig,
    quals: &LoginActivityQuals,
    now: DateTime<Utc>,
) -> Option<ListRequest> {
    let lookback = Duration::try_days(config.lookback_days)?;
    let window = TimeWindow::resolve(&quals.time, now, lookback)?;

    let mut request = ListRequest::new(config.user_key.clone(), APPLICATION_NAME);
    request.start_time = Some(window.start);
    request.end_time = Some(window.end);
    request.filters = quals.filters();
    Some(request)
}

struct Pager {
    source: Arc<dyn ActivitySource>,
    request: ListRequest,
    budget: PageBudget,
    buffer: std::vec::IntoIter<Activity>,
    last_page: bool,
}

impl Pager {
    /// Next record, fetching a new page when the current one is drained.
    async fn next(&mut self) -> Result<Option<Activity>> {
        loop {
            if let Some(reason) = self.budget.stop_reason() {
                debug!(
                    emitted = self.budget.emitted(),
                    reason = ?reason,
                    "Stopping login activity fetch"
                );
                return Ok(None);
            }

            if let Some(activity) = self.buffer.next() {
                self.budget.record();
                return Ok(Some(activity));
            }

            if self.last_page {
                return Ok(None);
            }

            let Some(page_size) = self.budget.next_page_size() else {
                return Ok(None);
            };
            self.request.max_results = Some(page_size);

            let page = match self.source.list(&self.request).await {
                Ok(page) => page,
                Err(e) => {
                    error!(
                        operation = LIST_OPERATION,
                        emitted = self.budget.emitted(),
                        error = %e,
                        "Login activity list call failed"
                    );
                    return Err(e);
                }
            };

            debug!(
                items = page.items.len(),
                page_size,
                has_more = page.continuation().is_some(),
                "Fetched login activity page"
            );

            match page.continuation() {
                Some(token) => self.request.page_token = Some(token.to_string()),
                None => self.last_page = true,
            }
            self.buffer = page.items.into_iter();
        }
    }
}

/// Streams login activities matching `quals`.
///
/// Lazy and single-pass: no request is made until the stream is polled, and
/// dropping it stops pagination. An empty time window yields nothing without
/// calling the source. A source error is yielded once and ends the stream;
/// records yielded before it stand.
pub fn fetch_activities(
    source: Arc<dyn ActivitySource>,
    config: &ConnectorConfig,
    quals: &LoginActivityQuals,
    row_limit: Option<u64>,
    now: DateTime<Utc>,
) -> impl Stream<Item = Result<Activity>> + Send + 'static {
    let pager = initial_request(config, quals, now).map(|request| Pager {
        source,
        request,
        budget: PageBudget::new(config.max_total_results, row_limit, config.page_size_max),
        buffer: Vec::new().into_iter(),
        last_page: false,
    });
    if pager.is_none() {
        debug!("Empty time window, skipping login activity fetch");
    }

    stream::try_unfold(pager, |pager| async move {
        let Some(mut pager) = pager else {
            return Ok(None);
        };
        let next = pager.next().await?;
        anyhow::Ok(next.map(|activity| (activity, Some(pager))))
    })
}
