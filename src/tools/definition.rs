//! Tool names and the advertised tool descriptors
//!
//! Field names and descriptions are part of the caller contract and must not drift.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::math::Operation;

/// Tools the gateway answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    Fetch,
    Schema,
    QueryKql,
    Math,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [Self::Fetch, Self::Schema, Self::QueryKql, Self::Math];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "fetch" => Some(Self::Fetch),
            "schema" => Some(Self::Schema),
            "querykql" => Some(Self::QueryKql),
            "math" => Some(Self::Math),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Schema => "schema",
            Self::QueryKql => "querykql",
            Self::Math => "math",
        }
    }

    /// Arguments that must be present before the tool runs
    pub fn required_arguments(&self) -> &'static [&'static str] {
        match self {
            Self::Fetch => &["url"],
            Self::Schema => &["tableName"],
            Self::QueryKql => &["queryName", "parameter"],
            Self::Math => &["a", "b", "operation"],
        }
    }

    /// Whether the tool reads the catalog
    pub fn uses_catalog(&self) -> bool {
        matches!(self, Self::Schema | Self::QueryKql)
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        match self {
            Self::Fetch => ToolDescriptor::new("fetch", "Fetches a website and returns its content")
                .with_schema(json!({
                    "type": "object",
                    "required": ["url"],
                    "properties": {
                        "url": {
                            "type": "string",
                            "description": "URL to fetch"
                        }
                    }
                })),
            Self::Schema => ToolDescriptor::new("schema", "fetches a schema for a given table name")
                .with_schema(json!({
                    "type": "object",
                    "required": ["tableName"],
                    "properties": {
                        "tableName": {
                            "type": "string",
                            "description": "Table name to fetch schema for"
                        }
                    }
                })),
            Self::QueryKql => ToolDescriptor::new("querykql", "Gets data by executing a KQL query")
                .with_schema(json!({
                    "type": "object",
                    "required": ["queryName", "parameter"],
                    "properties": {
                        "queryName": {
                            "type": "string",
                            "description": "The name of the query to execute"
                        },
                        "parameter": {
                            "type": "string",
                            "description": "The parameter to use in the query"
                        }
                    }
                })),
            Self::Math => ToolDescriptor::new(
                "math",
                "Adds, subtracts, multiplies, or divides two numbers",
            )
            .with_schema(json!({
                "type": "object",
                "required": ["a", "b", "operation"],
                "properties": {
                    "a": {
                        "type": "number",
                        "description": "first number"
                    },
                    "b": {
                        "type": "number",
                        "description": "second number"
                    },
                    "operation": {
                        "type": "string",
                        "enum": Operation::NAMES,
                        "description": "Operation to perform"
                    }
                }
            })),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name, description and input contract of one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON schema for input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Create a new descriptor with an empty object schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    /// Set input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Names listed under `required`
    pub fn required(&self) -> Vec<&str> {
        self.input_schema["required"]
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Descriptors for every tool, in advertisement order
pub fn advertised() -> Vec<ToolDescriptor> {
    ToolName::ALL.iter().map(ToolName::descriptor).collect()
}
