//! Query backend seam
//!
//! The dispatcher and schema resolver talk to the analytics service only
//! through this trait.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;

/// Column name to column type
pub type ColumnMap = BTreeMap<String, String>;

/// Remote query execution and schema lookup
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Run `query` against `database` on `cluster`, returning the result as text.
    ///
    /// Failures (including timeouts) are `GatewayError::QueryExecution`.
    async fn execute_query(&self, cluster: &str, database: &str, query: &str) -> Result<String>;

    /// Column map for `table`.
    ///
    /// Failures (including timeouts) are `GatewayError::SchemaFetch`.
    async fn fetch_schema(&self, cluster: &str, database: &str, table: &str) -> Result<ColumnMap>;
}
