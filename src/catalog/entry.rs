//! Catalog entry types
//!
//! An entry is either a schema definition or a parameterized query definition,
//! looked up by its key within its own entry type.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminant used for lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Schema,
    Query,
}

impl EntryType {
    /// Parse from the catalog's `type` field
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "schema" => Some(Self::Schema),
            "query" => Some(Self::Query),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema definition: where the table lives and how to ask for its columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub cluster: String,
    pub database: String,
    /// Pipeline of the form `"<table> | getschema"`
    #[serde(rename = "schemaCmd", alias = "schemaCommand")]
    pub schema_command: String,
    #[serde(default)]
    pub description: String,
    /// Column map recorded alongside the definition, never used in place of a live fetch
    #[serde(
        rename = "schema",
        alias = "cachedSchema",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cached_schema: Option<BTreeMap<String, String>>,
}

/// Query definition with `<name>` placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEntry {
    pub cluster: String,
    pub database: String,
    #[serde(rename = "queryCmd", alias = "queryTemplate")]
    pub query_template: String,
    #[serde(default)]
    pub description: String,
}

/// Variant payload of a catalog entry
#[derive(Debug, Clone, PartialEq)]
pub enum EntryBody {
    Schema(SchemaEntry),
    Query(QueryEntry),
}

/// One named definition in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub key: String,
    pub body: EntryBody,
}

impl CatalogEntry {
    pub fn schema(key: impl Into<String>, entry: SchemaEntry) -> Self {
        Self {
            key: key.into(),
            body: EntryBody::Schema(entry),
        }
    }

    pub fn query(key: impl Into<String>, entry: QueryEntry) -> Self {
        Self {
            key: key.into(),
            body: EntryBody::Query(entry),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self.body {
            EntryBody::Schema(_) => EntryType::Schema,
            EntryBody::Query(_) => EntryType::Query,
        }
    }

    pub fn as_schema(&self) -> Option<&SchemaEntry> {
        match &self.body {
            EntryBody::Schema(entry) => Some(entry),
            EntryBody::Query(_) => None,
        }
    }

    pub fn as_query(&self) -> Option<&QueryEntry> {
        match &self.body {
            EntryBody::Query(entry) => Some(entry),
            EntryBody::Schema(_) => None,
        }
    }

    /// Cluster the entry targets
    pub fn cluster(&self) -> &str {
        match &self.body {
            EntryBody::Schema(entry) => &entry.cluster,
            EntryBody::Query(entry) => &entry.cluster,
        }
    }

    /// Database the entry targets
    pub fn database(&self) -> &str {
        match &self.body {
            EntryBody::Schema(entry) => &entry.database,
            EntryBody::Query(entry) => &entry.database,
        }
    }

    /// Stored command text (schema command or query template)
    pub fn command(&self) -> &str {
        match &self.body {
            EntryBody::Schema(entry) => &entry.schema_command,
            EntryBody::Query(entry) => &entry.query_template,
        }
    }

    pub fn description(&self) -> &str {
        match &self.body {
            EntryBody::Schema(entry) => &entry.description,
            EntryBody::Query(entry) => &entry.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_type_from_str() {
        assert_eq!(EntryType::from_str("schema"), Some(EntryType::Schema));
        assert_eq!(EntryType::from_str("query"), Some(EntryType::Query));
        assert_eq!(EntryType::from_str("Schema"), None);
        assert_eq!(EntryType::from_str("table"), None);
    }

    #[test]
    fn test_schema_entry_wire_names() {
        let entry: SchemaEntry = serde_json::from_value(json!({
            "cluster": "help",
            "database": "Samples",
            "schemaCmd": "Employees | getschema",
            "description": "Employee directory"
        }))
        .unwrap();

        assert_eq!(entry.schema_command, "Employees | getschema");
        assert!(entry.cached_schema.is_none());
    }

    #[test]
    fn test_schema_entry_accepts_long_names() {
        let entry: SchemaEntry = serde_json::from_value(json!({
            "cluster": "help",
            "database": "Samples",
            "schemaCommand": "Employees | getschema",
            "cachedSchema": {"Name": "string"}
        }))
        .unwrap();

        assert_eq!(entry.description, "");
        assert_eq!(entry.cached_schema.unwrap()["Name"], "string");
    }

    #[test]
    fn test_query_entry_requires_template() {
        let result = serde_json::from_value::<QueryEntry>(json!({
            "cluster": "help",
            "database": "Samples"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_accessors_follow_variant() {
        let entry = CatalogEntry::query(
            "employeeroles",
            QueryEntry {
                cluster: "help".to_string(),
                database: "Samples".to_string(),
                query_template: "Employees | take 1".to_string(),
                description: "Roles".to_string(),
            },
        );

        assert_eq!(entry.entry_type(), EntryType::Query);
        assert!(entry.as_schema().is_none());
        assert!(entry.as_query().is_some());
        assert_eq!(entry.command(), "Employees | take 1");
        assert_eq!(entry.cluster(), "help");
    }
}
