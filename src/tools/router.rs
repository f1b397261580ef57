//! Tool routing and execution
//!
//! Defines the ToolRouter trait the protocol host calls, and ToolDispatcher which
//! resolves calls against math, the catalog-backed KQL tools, and fetch.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::catalog::CatalogHandle;
use crate::config::{Config, QueriesConfig};
use crate::error::{GatewayError, Result};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::kql::{DEFAULT_PARAMETER, KustoBackend, QueryBackend, QueryBuilder, SchemaResolver, placeholders};

use super::content::ContentBlock;
use super::definition::{ToolDescriptor, ToolName, advertised};
use super::math::{self, Operand};

/// Tool-call entry point used by the protocol host
#[async_trait]
pub trait ToolRouter: Send + Sync {
    /// Run one tool call to completion
    async fn call(&self, name: &str, arguments: &Map<String, Value>) -> Result<Vec<ContentBlock>>;

    /// Tools available to callers
    fn descriptors(&self) -> Vec<ToolDescriptor>;
}

/// Every key in `required` missing from `arguments`, or Ok
pub fn require(arguments: &Map<String, Value>, required: &[&str]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|key| !arguments.contains_key(**key))
        .map(|key| key.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(GatewayError::MissingArgument(missing))
    }
}

fn string_argument<'a>(arguments: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    match arguments.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(GatewayError::invalid_argument(
            key,
            format!("expected a string, got {}", other),
        )),
        None => Err(GatewayError::MissingArgument(vec![key.to_string()])),
    }
}

/// Stateless dispatcher; safe to share across concurrent calls
pub struct ToolDispatcher {
    catalog: Arc<CatalogHandle>,
    backend: Arc<dyn QueryBackend>,
    fetcher: Arc<dyn Fetcher>,
    /// queryName -> catalog query key
    allowed_queries: BTreeMap<String, String>,
    builder: QueryBuilder,
}

impl ToolDispatcher {
    /// Create a dispatcher with the default single-query allow-list
    pub fn new(
        catalog: Arc<CatalogHandle>,
        backend: Arc<dyn QueryBackend>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            catalog,
            backend,
            fetcher,
            allowed_queries: QueriesConfig::default().allowed,
            builder: QueryBuilder::new(),
        }
    }

    /// Dispatcher wired to Kusto and HTTP from config.
    ///
    /// The catalog is loaded here only when `catalog.eager` is set.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let catalog = CatalogHandle::from_path(&config.catalog.path);
        if config.catalog.eager {
            catalog.get().await?;
        }

        let backend = KustoBackend::new(&config.kusto)?;
        let fetcher = HttpFetcher::new(&config.fetch)?;

        Ok(Self::new(Arc::new(catalog), Arc::new(backend), Arc::new(fetcher))
            .with_allowed_queries(config.queries.allowed.clone()))
    }

    /// Replace the querykql allow-list
    pub fn with_allowed_queries(mut self, allowed: BTreeMap<String, String>) -> Self {
        self.allowed_queries = allowed;
        self
    }

    /// Replace the query backend
    pub fn with_backend(mut self, backend: Arc<dyn QueryBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    pub fn allowed_queries(&self) -> &BTreeMap<String, String> {
        &self.allowed_queries
    }

    /// Route one call; arguments are checked before anything is resolved
    pub async fn dispatch(&self, name: &str, arguments: &Map<String, Value>) -> Result<Vec<ContentBlock>> {
        let tool = ToolName::from_str(name).ok_or_else(|| GatewayError::UnknownTool(name.to_string()))?;
        require(arguments, tool.required_arguments())?;

        match tool {
            ToolName::Fetch => {
                let url = string_argument(arguments, "url")?;
                self.fetcher.fetch(url).await
            }
            ToolName::Schema => {
                let table = string_argument(arguments, "tableName")?;
                self.describe_schema(table).await
            }
            ToolName::QueryKql => {
                let query_name = string_argument(arguments, "queryName")?;
                string_argument(arguments, DEFAULT_PARAMETER)?;
                self.run_query(query_name, arguments).await
            }
            ToolName::Math => {
                let a = Operand::from_value("a", &arguments["a"])?;
                let b = Operand::from_value("b", &arguments["b"])?;
                let operation = math::parse_operation(&arguments["operation"])?;
                let result = math::evaluate(a, b, operation)?;
                Ok(vec![ContentBlock::text(result.render())])
            }
        }
    }

    async fn describe_schema(&self, table: &str) -> Result<Vec<ContentBlock>> {
        let catalog = self.catalog.get().await?;
        let entry = catalog
            .find_schema(table)
            .ok_or_else(|| GatewayError::UnknownSchema(table.to_string()))?;

        let description = SchemaResolver::new(self.backend.as_ref()).resolve(entry).await?;
        Ok(vec![ContentBlock::text(serde_json::to_string_pretty(&description)?)])
    }

    async fn run_query(&self, query_name: &str, arguments: &Map<String, Value>) -> Result<Vec<ContentBlock>> {
        let key = self
            .allowed_queries
            .get(query_name)
            .ok_or_else(|| GatewayError::UnknownQuery(query_name.to_string()))?;

        let catalog = self.catalog.get().await?;
        let entry = catalog
            .find_query(key)
            .ok_or_else(|| GatewayError::UnknownQuery(query_name.to_string()))?;

        let used = placeholders(&entry.query_template);
        let mut parameters = HashMap::new();
        for (name, value) in arguments.iter().filter(|(name, _)| name.as_str() != "queryName") {
            match value {
                Value::String(s) => {
                    parameters.insert(name.clone(), s.clone());
                }
                other if used.contains(&name.as_str()) => {
                    return Err(GatewayError::invalid_argument(
                        name.as_str(),
                        format!("expected a string, got {}", other),
                    ));
                }
                _ => {}
            }
        }

        let query = self.builder.build(entry, &parameters)?;
        log::debug!("Executing query '{}' on {}/{}", key, entry.cluster, entry.database);

        let text = self
            .backend
            .execute_query(&entry.cluster, &entry.database, &query)
            .await
            .map_err(|e| match e {
                GatewayError::QueryExecution(message) => GatewayError::QueryExecution(message),
                other => GatewayError::QueryExecution(other.to_string()),
            })?;

        Ok(vec![ContentBlock::text(text)])
    }
}

#[async_trait]
impl ToolRouter for ToolDispatcher {
    async fn call(&self, name: &str, arguments: &Map<String, Value>) -> Result<Vec<ContentBlock>> {
        let started = Instant::now();
        let result = self.dispatch(name, arguments).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(blocks) => tracing::info!(tool = name, elapsed_ms, blocks = blocks.len(), "tool call succeeded"),
            Err(e) => tracing::warn!(tool = name, elapsed_ms, error = %e, "tool call failed"),
        }
        result
    }

    fn descriptors(&self) -> Vec<ToolDescriptor> {
        advertised()
    }
}
