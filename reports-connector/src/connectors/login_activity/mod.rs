pub mod api;
pub mod config;
pub mod fetch;
pub mod quals;
pub mod transformer;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use futures::{Stream, StreamExt};
use query_host::{
    ColumnSchema, GetConfig, KeyColumn, ListConfig, Operator, QueryData, Row, RowStream, Table,
    TableDefinition, TableInfo,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error};

use self::api::ReportsClient;
use self::config::{access_token_from_env, ConnectorConfig, TABLE_NAME};
use self::fetch::fetch_activities;
use self::quals::LoginActivityQuals;
use crate::activity::Activity;
use crate::source::ActivitySource;

/// Table metadata: key columns and tags of list and get.
pub fn table_info() -> TableInfo {
    TableInfo {
        name: TABLE_NAME,
        description: "Admin Reports API login activities",
        list: ListConfig {
            key_columns: vec![
                KeyColumn::optional("time").with_operators(Operator::ALL),
                KeyColumn::optional("actor_email"),
                KeyColumn::optional("ip_address"),
                KeyColumn::optional("event_name"),
            ],
            tags: tags("activities.list"),
        },
        get: GetConfig {
            key_columns: vec![
                KeyColumn::required("time"),
                KeyColumn::required("unique_qualifier"),
                KeyColumn::required("actor_email"),
            ],
            tags: tags("activities.get"),
            supported: false,
        },
    }
}

/// Static table definition: metadata plus column extractors.
pub fn definition() -> TableDefinition<Activity> {
    TableDefinition {
        info: table_info(),
        columns: transformer::columns(),
    }
}

fn tags(action: &'static str) -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("service", "admin"),
        ("product", "reports"),
        ("action", action),
    ])
}

/// `gcp_admin_reports_login_activity` — login events from the Reports API.
///
/// List pages through the API within a time window and the equality filters
/// pushed down by the host. Get is declared but not supported: it never
/// returns a row.
pub struct LoginActivityTable {
    source: Arc<dyn ActivitySource>,
    config: ConnectorConfig,
    definition: Arc<TableDefinition<Activity>>,
}

impl LoginActivityTable {
    /// Create a table over any activity source (fakes in tests).
    pub fn new(source: Arc<dyn ActivitySource>, config: ConnectorConfig) -> Self {
        Self {
            source,
            config,
            definition: Arc::new(definition()),
        }
    }

    /// Create a table backed by the Reports API, reading the access token
    /// from the environment.
    pub fn from_config(config: ConnectorConfig) -> Result<Self> {
        let client = access_token_from_env()
            .and_then(|token| ReportsClient::from_config(token, &config))
            .map_err(|e| {
                error!(table = TABLE_NAME, error = %e, "Failed to create Reports API client");
                e
            })?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Raw activities for `query`, before projection.
    ///
    /// Qualifier values that cannot be pushed down fail here, before any
    /// request is made.
    pub fn list_activities(
        &self,
        query: &QueryData,
    ) -> Result<impl Stream<Item = Result<Activity>> + Send + 'static> {
        let quals = LoginActivityQuals::from_quals(&query.quals).map_err(|e| {
            error!(operation = fetch::LIST_OPERATION, error = %e, "Rejected login activity quals");
            e
        })?;
        debug!(
            table = TABLE_NAME,
            time_quals = quals.time.len(),
            filters = quals.filters().len(),
            limit = ?query.limit,
            "Listing login activities"
        );
        Ok(fetch_activities(
            Arc::clone(&self.source),
            &self.config,
            &quals,
            query.limit,
            Utc::now(),
        ))
    }
}

#[async_trait]
impl Table for LoginActivityTable {
    fn info(&self) -> &TableInfo {
        &self.definition.info
    }

    fn columns(&self) -> Vec<ColumnSchema> {
        self.definition.schema()
    }

    fn list(&self, query: &QueryData) -> Result<RowStream> {
        let definition = Arc::clone(&self.definition);
        Ok(self
            .list_activities(query)?
            .map(move |activity| activity.map(|a| definition.project(&a)))
            .boxed())
    }

    async fn get(&self, _query: &QueryData) -> Result<Option<Row>> {
        debug!(table = TABLE_NAME, "Point lookup is not supported, returning no row");
        Ok(None)
    }
}
