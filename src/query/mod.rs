use crate::quals::Quals;

/// Per-invocation query context handed to a table's list/get operations.
#[derive(Clone, Debug, Default)]
pub struct QueryData {
    /// Qualifiers pushed down from the query's `WHERE` clause.
    pub quals: Quals,

    /// SQL-level row limit, if the query carried one.
    pub limit: Option<u64>,
}

impl QueryData {
    pub fn new(quals: Quals, limit: Option<u64>) -> Self {
        Self { quals, limit }
    }
}
