//! Reports Connector - Admin Reports API login activity as a queryable table.
//!
//! This crate serves the `gcp_admin_reports_login_activity` table to a host
//! query engine. Rows come from the Admin SDK Reports API
//! (`activities.list`, application `login`), paged on demand and projected
//! through a static column list.
//!
//! # Architecture
//!
//! ```text
//!       Host query engine
//!          ↓  QueryData (quals, limit)
//! ┌─────────────────────────────────────────┐
//! │       LoginActivityTable (Table)         │
//! │  - Typed quals → time window + filters   │
//! │  - Bounded paginated fetch               │
//! │  - Column projection                     │
//! └─────────────────────────────────────────┘
//!          ↓  ListRequest (one page at a time)
//! ┌─────────────────────────────────────────┐
//! │       ActivitySource                     │
//! │  - ReportsClient (HTTP, bearer token)    │
//! └─────────────────────────────────────────┘
//!          ↓
//!     Admin SDK Reports API
//! ```
//!
//! # Core Types
//!
//! - [`ActivitySource`] - Remote source of activity pages
//! - [`Activity`] - One login activity record
//! - [`LoginActivityTable`] - The table served to the host
//!
//! # Listing activities
//!
//! ```no_run
//! use futures::StreamExt;
//! use query_host::{Operator, QualValue, Quals, QueryData, Table};
//! use reports_connector::{ConnectorConfig, LoginActivityTable};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let table = LoginActivityTable::from_config(ConnectorConfig::default())?;
//! let query = QueryData::new(
//!     Quals::new().with("actor_email", Operator::Eq, QualValue::String("a@b.com".into())),
//!     Some(20),
//! );
//! let mut rows = table.list(&query)?;
//! while let Some(row) = rows.next().await {
//!     println!("{}", serde_json::Value::Object(row?));
//! }
//! # Ok(())
//! # }
//! ```

mod activity;
mod source;
pub mod connectors;
pub mod registry;

pub use activity::{Activity, ActivityEvent, ActivityId, ActivityPage, Actor};
pub use connectors::login_activity::config::{load_config, ConnectorConfig};
pub use connectors::login_activity::LoginActivityTable;
pub use source::{ActivitySource, ListRequest};
