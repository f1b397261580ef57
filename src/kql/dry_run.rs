//! Backend that never leaves the process

use async_trait::async_trait;
use serde_json::json;

use crate::error::Result;

use super::backend::{ColumnMap, QueryBackend};

/// Echoes the query it would have run and reports empty schemas
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunBackend;

#[async_trait]
impl QueryBackend for DryRunBackend {
    async fn execute_query(&self, cluster: &str, database: &str, query: &str) -> Result<String> {
        let plan = json!({
            "cluster": cluster,
            "database": database,
            "query": query,
        });
        Ok(serde_json::to_string_pretty(&plan)?)
    }

    async fn fetch_schema(&self, _cluster: &str, _database: &str, table: &str) -> Result<ColumnMap> {
        log::debug!("Dry run: skipping schema fetch for {}", table);
        Ok(ColumnMap::new())
    }
}
