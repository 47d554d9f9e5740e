//! Table registry - the tables this plugin serves.

use crate::connectors::login_activity::config::ConnectorConfig;
use crate::connectors::login_activity::LoginActivityTable;
use anyhow::Result;
use query_host::Table;
use std::sync::Arc;

/// Returns all tables backed by the Reports API.
pub fn get_all_tables(config: &ConnectorConfig) -> Result<Vec<Arc<dyn Table>>> {
    let login: Arc<dyn Table> = Arc::new(LoginActivityTable::from_config(config.clone())?);
    Ok(vec![login])
}

/// Finds a table by name.
pub fn find_table<'a>(tables: &'a [Arc<dyn Table>], name: &str) -> Option<&'a Arc<dyn Table>> {
    tables.iter().find(|t| t.info().name == name)
}
