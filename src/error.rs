//! Error types for kqlgate
//!
//! Centralized error handling using thiserror. Every variant is terminal for the
//! tool call that produced it.

use thiserror::Error;

/// All error types that can occur while resolving a tool call
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Catalog source unreadable, malformed, or holding an invalid entry
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    /// Schema command with no leading table token
    #[error("Malformed schema command: '{0}'")]
    MalformedSchemaCommand(String),

    /// Tool name not advertised by the gateway
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// No schema entry with the requested key
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    /// Query name not allowed, or allowed but not cataloged
    #[error("Unknown query name: {0}")]
    UnknownQuery(String),

    /// Math operation outside add/subtract/multiply/divide
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// One or more required tool arguments absent
    #[error("Missing required argument(s): {}", quote_all(.0))]
    MissingArgument(Vec<String>),

    /// Query template placeholder with no supplied value
    #[error("Missing value for query parameter '{0}'")]
    MissingParameter(String),

    /// Argument present but of the wrong JSON type
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("Division by zero is not allowed")]
    DivisionByZero,

    /// Schema collaborator failure
    #[error("Unable to get schema: {0}")]
    SchemaFetch(String),

    /// Query collaborator failure
    #[error("Unable to execute query: {0}")]
    QueryExecution(String),

    /// Content-fetch collaborator failure
    #[error("Unable to fetch url: {0}")]
    Fetch(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    /// Build an invalid-argument error for `name`
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

fn quote_all(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for kqlgate operations
pub type Result<T> = std::result::Result<T, GatewayError>;
