//! Azure Data Explorer (Kusto) REST backend
//!
//! Uses the v1 query endpoint. Authentication is a bearer token taken from the
//! environment variable named in the config; acquiring that token is left to the
//! operator.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value, json};

use crate::config::KustoConfig;
use crate::error::{GatewayError, Result};

use super::backend::{ColumnMap, QueryBackend};

/// Kusto REST client
pub struct KustoBackend {
    client: Client,
    endpoint_template: String,
    token: Option<String>,
}

impl KustoBackend {
    /// Create a backend from config, reading the token from `config.token_env` if set
    pub fn new(config: &KustoConfig) -> Result<Self> {
        let token = config
            .token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|token| !token.is_empty());

        if token.is_none() {
            log::warn!("No Kusto access token found; requests will be sent unauthenticated");
        }

        Self::with_token(config, token)
    }

    /// Create a backend with an explicit token
    pub fn with_token(config: &KustoConfig, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| GatewayError::QueryExecution(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint_template: config.endpoint_template.clone(),
            token,
        })
    }

    /// Base URL for `cluster`; full URLs pass through unchanged
    pub fn endpoint(&self, cluster: &str) -> String {
        if cluster.starts_with("https://") || cluster.starts_with("http://") {
            cluster.trim_end_matches('/').to_string()
        } else {
            self.endpoint_template
                .replace("{cluster}", cluster)
                .trim_end_matches('/')
                .to_string()
        }
    }

    /// POST `csl` to the query endpoint and return the decoded body
    async fn run(&self, cluster: &str, database: &str, csl: &str) -> std::result::Result<Value, String> {
        let url = format!("{}/v1/rest/query", self.endpoint(cluster));
        log::debug!("Kusto query on {} / {}: {}", url, database, csl);

        let mut request = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&json!({ "db": database, "csl": csl }));

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                format!("request to {} timed out", url)
            } else {
                format!("request to {} failed: {}", url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {}: {}", status, body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| format!("Failed to decode response: {}", e))
    }
}

/// Rows of the primary result table as column-name keyed objects
pub fn primary_rows(body: &Value) -> std::result::Result<Vec<Map<String, Value>>, String> {
    let table = body["Tables"]
        .as_array()
        .and_then(|tables| tables.first())
        .ok_or_else(|| "response has no result tables".to_string())?;

    let columns: Vec<&str> = table["Columns"]
        .as_array()
        .ok_or_else(|| "result table has no columns".to_string())?
        .iter()
        .map(|column| column["ColumnName"].as_str().unwrap_or_default())
        .collect();

    let rows = table["Rows"]
        .as_array()
        .ok_or_else(|| "result table has no rows".to_string())?;

    Ok(rows
        .iter()
        .filter_map(Value::as_array)
        .map(|row| {
            columns
                .iter()
                .zip(row.iter())
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect()
        })
        .collect())
}

/// Column map from the rows of a `getschema` result
pub fn schema_from_rows(rows: &[Map<String, Value>]) -> ColumnMap {
    rows.iter()
        .filter_map(|row| {
            let name = row.get("ColumnName")?.as_str()?;
            let column_type = row.get("ColumnType")?.as_str()?;
            Some((name.to_string(), column_type.to_string()))
        })
        .collect()
}

#[async_trait]
impl QueryBackend for KustoBackend {
    async fn execute_query(&self, cluster: &str, database: &str, query: &str) -> Result<String> {
        let body = self
            .run(cluster, database, query)
            .await
            .map_err(GatewayError::QueryExecution)?;
        let rows = primary_rows(&body).map_err(GatewayError::QueryExecution)?;
        Ok(serde_json::to_string_pretty(&rows)?)
    }

    async fn fetch_schema(&self, cluster: &str, database: &str, table: &str) -> Result<ColumnMap> {
        let csl = format!("{} | getschema", table);
        let body = self
            .run(cluster, database, &csl)
            .await
            .map_err(GatewayError::SchemaFetch)?;
        let rows = primary_rows(&body).map_err(GatewayError::SchemaFetch)?;
        Ok(schema_from_rows(&rows))
    }
}
