//! Schema resolution for catalog schema entries

use serde::{Deserialize, Serialize};

use crate::catalog::SchemaEntry;
use crate::error::{GatewayError, Result};

use super::backend::{ColumnMap, QueryBackend};

/// Table named by a schema command such as `"Employees | getschema"`.
///
/// The table is the text before the first whitespace or `|`.
pub fn table_name(schema_command: &str) -> Result<&str> {
    let trimmed = schema_command.trim_start();
    let end = trimmed
        .find(|c: char| c.is_whitespace() || c == '|')
        .unwrap_or(trimmed.len());
    let table = &trimmed[..end];

    if table.is_empty() {
        return Err(GatewayError::MalformedSchemaCommand(schema_command.to_string()));
    }
    Ok(table)
}

/// Response body of the `schema` tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub cluster: String,
    pub database: String,
    pub table: String,
    pub schema: ColumnMap,
    pub description: String,
}

/// Resolves schema entries against a live backend. Nothing is cached.
pub struct SchemaResolver<'a> {
    backend: &'a dyn QueryBackend,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(backend: &'a dyn QueryBackend) -> Self {
        Self { backend }
    }

    pub async fn resolve(&self, entry: &SchemaEntry) -> Result<SchemaDescription> {
        let table = table_name(&entry.schema_command)?;
        let schema = self
            .backend
            .fetch_schema(&entry.cluster, &entry.database, table)
            .await
            .map_err(|e| match e {
                GatewayError::SchemaFetch(message) => GatewayError::SchemaFetch(message),
                other => GatewayError::SchemaFetch(other.to_string()),
            })?;

        Ok(SchemaDescription {
            cluster: entry.cluster.clone(),
            database: entry.database.clone(),
            table: table.to_string(),
            schema,
            description: entry.description.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend answering schema lookups from a fixed map
    #[derive(Default)]
    struct StaticBackend {
        columns: ColumnMap,
        fail_with: Option<String>,
        calls: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl QueryBackend for StaticBackend {
        async fn execute_query(&self, _cluster: &str, _database: &str, query: &str) -> Result<String> {
            Ok(query.to_string())
        }

        async fn fetch_schema(&self, cluster: &str, database: &str, table: &str) -> Result<ColumnMap> {
            self.calls
                .lock()
                .unwrap()
                .push((cluster.to_string(), database.to_string(), table.to_string()));
            match &self.fail_with {
                Some(message) => Err(GatewayError::Io(std::io::Error::other(message.clone()))),
                None => Ok(self.columns.clone()),
            }
        }
    }

    fn employees_entry() -> SchemaEntry {
        SchemaEntry {
            cluster: "help".to_string(),
            database: "Samples".to_string(),
            schema_command: "Employees | getschema".to_string(),
            description: "Employee directory".to_string(),
            cached_schema: None,
        }
    }

    #[test]
    fn test_table_name_from_pipeline() {
        assert_eq!(table_name("Employees | getschema").unwrap(), "Employees");
    }

    #[test]
    fn test_table_name_without_spaces() {
        assert_eq!(table_name("Employees|getschema").unwrap(), "Employees");
    }

    #[test]
    fn test_table_name_leading_whitespace_and_tabs() {
        assert_eq!(table_name("  StormEvents\t| getschema").unwrap(), "StormEvents");
    }

    #[test]
    fn test_table_name_bare_table() {
        assert_eq!(table_name("Employees").unwrap(), "Employees");
    }

    #[test]
    fn test_table_name_empty_is_error() {
        assert!(matches!(table_name(""), Err(GatewayError::MalformedSchemaCommand(_))));
        assert!(matches!(table_name("   "), Err(GatewayError::MalformedSchemaCommand(_))));
    }

    #[test]
    fn test_table_name_leading_pipe_is_error() {
        assert!(matches!(
            table_name("| getschema"),
            Err(GatewayError::MalformedSchemaCommand(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_assembles_description() {
        let backend = StaticBackend {
            columns: [("Name", "string"), ("Role", "string")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        };

        let description = SchemaResolver::new(&backend)
            .resolve(&employees_entry())
            .await
            .unwrap();

        assert_eq!(description.cluster, "help");
        assert_eq!(description.database, "Samples");
        assert_eq!(description.table, "Employees");
        assert_eq!(description.schema.len(), 2);
        assert_eq!(description.description, "Employee directory");

        let calls = backend.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[("help".to_string(), "Samples".to_string(), "Employees".to_string())]
        );
    }

    #[tokio::test]
    async fn test_resolve_fetches_every_time() {
        let backend = StaticBackend::default();
        let resolver = SchemaResolver::new(&backend);

        resolver.resolve(&employees_entry()).await.unwrap();
        resolver.resolve(&employees_entry()).await.unwrap();

        assert_eq!(backend.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_ignores_cached_schema() {
        let backend = StaticBackend::default();
        let mut entry = employees_entry();
        entry.cached_schema = Some([("Stale".to_string(), "int".to_string())].into_iter().collect());

        let description = SchemaResolver::new(&backend).resolve(&entry).await.unwrap();
        assert!(description.schema.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_wraps_backend_failure() {
        let backend = StaticBackend {
            fail_with: Some("connection refused".to_string()),
            ..Default::default()
        };

        let err = SchemaResolver::new(&backend)
            .resolve(&employees_entry())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::SchemaFetch(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_resolve_malformed_command_skips_backend() {
        let backend = StaticBackend::default();
        let mut entry = employees_entry();
        entry.schema_command = "  ".to_string();

        let err = SchemaResolver::new(&backend).resolve(&entry).await.unwrap_err();
        assert!(matches!(err, GatewayError::MalformedSchemaCommand(_)));
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_description_serializes_in_field_order() {
        let description = SchemaDescription {
            cluster: "help".to_string(),
            database: "Samples".to_string(),
            table: "Employees".to_string(),
            schema: ColumnMap::new(),
            description: "d".to_string(),
        };
        let json = serde_json::to_string(&description).unwrap();
        assert_eq!(
            json,
            r#"{"cluster":"help","database":"Samples","table":"Employees","schema":{},"description":"d"}"#
        );
    }
}
