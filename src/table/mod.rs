//! Declarative table metadata.
//!
//! A table is described as data: a name, the key columns its list and get
//! operations accept, and an ordered list of columns. Each column carries a
//! plain extractor function, so projecting an item into a row is just
//! applying every extractor in turn.
//!
//! ```text
//!   item ──► ColumnDef::extract ──► serde_json::Value ──► Row[column.name]
//! ```

use crate::quals::Operator;
use crate::query::QueryData;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A projected row: column name to value.
pub type Row = serde_json::Map<String, Value>;

/// Lazily produced rows of a list operation.
pub type RowStream = BoxStream<'static, Result<Row>>;

/// Column data type as exposed to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Timestamp,
    String,
    Json,
}

/// Whether a key column must be present for the operation to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Require {
    Optional,
    Required,
}

/// A column the host may push qualifiers down on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KeyColumn {
    pub name: &'static str,
    pub require: Require,
    /// Operators accepted for this column.
    pub operators: &'static [Operator],
}

impl KeyColumn {
    /// Optional equality key column.
    pub fn optional(name: &'static str) -> Self {
        Self {
            name,
            require: Require::Optional,
            operators: &[Operator::Eq],
        }
    }

    /// Required equality key column.
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            require: Require::Required,
            operators: &[Operator::Eq],
        }
    }

    pub fn with_operators(mut self, operators: &'static [Operator]) -> Self {
        self.operators = operators;
        self
    }
}

/// List operation metadata.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ListConfig {
    pub key_columns: Vec<KeyColumn>,
    pub tags: BTreeMap<&'static str, &'static str>,
}

/// Point-lookup operation metadata.
#[derive(Clone, Debug, Default, Serialize)]
pub struct GetConfig {
    pub key_columns: Vec<KeyColumn>,
    pub tags: BTreeMap<&'static str, &'static str>,
    /// `false` when the table declares the lookup but never returns rows from it.
    pub supported: bool,
}

/// Table-level metadata, independent of the row type.
#[derive(Clone, Debug, Serialize)]
pub struct TableInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub list: ListConfig,
    pub get: GetConfig,
}

/// Column metadata without the extractor, for describing a table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnSchema {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub description: &'static str,
}

/// A column: metadata plus the function that reads it out of an item.
pub struct ColumnDef<T> {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub description: &'static str,
    pub extract: fn(&T) -> Value,
}

// Manual impl: a derive would require `T: Clone`.
impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            column_type: self.column_type,
            description: self.description,
            extract: self.extract,
        }
    }
}

impl<T> ColumnDef<T> {
    pub fn new(
        name: &'static str,
        column_type: ColumnType,
        description: &'static str,
        extract: fn(&T) -> Value,
    ) -> Self {
        Self {
            name,
            column_type,
            description,
            extract,
        }
    }

    pub fn schema(&self) -> ColumnSchema {
        ColumnSchema {
            name: self.name,
            column_type: self.column_type,
            description: self.description,
        }
    }
}

/// Full table definition over items of type `T`.
pub struct TableDefinition<T> {
    pub info: TableInfo,
    pub columns: Vec<ColumnDef<T>>,
}

impl<T> TableDefinition<T> {
    pub fn schema(&self) -> Vec<ColumnSchema> {
        self.columns.iter().map(ColumnDef::schema).collect()
    }

    /// Projects one item into a row holding every column.
    pub fn project(&self, item: &T) -> Row {
        self.columns
            .iter()
            .map(|c| (c.name.to_string(), (c.extract)(item)))
            .collect()
    }
}

/// A table served to the host query engine.
#[async_trait]
pub trait Table: Send + Sync {
    fn info(&self) -> &TableInfo;

    fn columns(&self) -> Vec<ColumnSchema>;

    /// Streams the rows matching `query`.
    ///
    /// Errors raised before the first row (e.g. the upstream client could not
    /// be built) are returned directly; errors during iteration end the stream.
    fn list(&self, query: &QueryData) -> Result<RowStream>;

    /// Point lookup by the get key columns.
    ///
    /// `Ok(None)` means no row. Tables whose [`GetConfig::supported`] is
    /// `false` always answer `Ok(None)`.
    async fn get(&self, query: &QueryData) -> Result<Option<Row>>;
}
