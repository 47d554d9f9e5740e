//! Query host interface.
//!
//! Types shared between a host query engine and the tables it serves:
//! qualifiers pushed down from a `WHERE` clause, per-query context (quals and
//! row limit), and declarative table/column metadata.

// Qualifiers and comparison operators
pub mod quals;

// Per-query context
pub mod query;

// Table and column metadata, row projection
pub mod table;

pub use quals::{Operator, ParseQualError, Qual, QualValue, Quals, UnknownOperator};
pub use query::QueryData;
pub use table::{
    ColumnDef, ColumnSchema, ColumnType, GetConfig, KeyColumn, ListConfig, Require, Row,
    RowStream, Table, TableDefinition, TableInfo,
};
