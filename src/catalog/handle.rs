//! Load-once catalog handle shared by concurrent tool calls

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::{GatewayError, Result};

use super::store::Catalog;

/// Where the catalog comes from
#[derive(Debug, Clone)]
pub enum CatalogSource {
    File(PathBuf),
    Json(String),
    Loaded(Arc<Catalog>),
}

/// Catalog that is parsed on first use and then shared read-only.
///
/// A failed load is remembered: every later access reports the same
/// `ConfigParse` error until the handle is reset.
#[derive(Debug)]
pub struct CatalogHandle {
    source: CatalogSource,
    cell: OnceCell<std::result::Result<Arc<Catalog>, String>>,
}

impl CatalogHandle {
    pub fn new(source: CatalogSource) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// Handle that reads `path` on first access
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(CatalogSource::File(path.into()))
    }

    /// Handle that parses `json` on first access
    pub fn from_json(json: impl Into<String>) -> Self {
        Self::new(CatalogSource::Json(json.into()))
    }

    /// Handle around an already-built catalog
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self::new(CatalogSource::Loaded(Arc::new(catalog)))
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// The catalog, loading it if this is the first access.
    ///
    /// Concurrent first callers wait on the same load.
    pub async fn get(&self) -> Result<Arc<Catalog>> {
        self.cell
            .get_or_init(|| async {
                self.load().await.map_err(|e| match e {
                    GatewayError::ConfigParse(message) => message,
                    other => other.to_string(),
                })
            })
            .await
            .clone()
            .map_err(GatewayError::ConfigParse)
    }

    /// Whether a load has been attempted
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Drop the loaded catalog so the next access reloads. Test use only.
    pub fn reset(&mut self) {
        self.cell.take();
    }

    async fn load(&self) -> Result<Arc<Catalog>> {
        match &self.source {
            CatalogSource::File(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || Catalog::from_file(path))
                    .await
                    .map_err(|e| GatewayError::ConfigParse(format!("Catalog load task failed: {}", e)))?
                    .map(Arc::new)
            }
            CatalogSource::Json(json) => Catalog::from_json(json).map(Arc::new),
            CatalogSource::Loaded(catalog) => Ok(Arc::clone(catalog)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ONE_QUERY: &str = r#"[
        {"type": "query", "key": "q", "data": {"cluster": "c", "database": "d", "queryCmd": "T"}}
    ]"#;

    #[test]
    fn test_handle_is_lazy() {
        let handle = CatalogHandle::from_path("/nonexistent/catalog.json");
        assert!(!handle.is_initialized());
    }

    #[tokio::test]
    async fn test_handle_loads_once() {
        let handle = CatalogHandle::from_json(ONE_QUERY);
        let first = handle.get().await.unwrap();
        let second = handle.get().await.unwrap();

        assert!(handle.is_initialized());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn test_handle_memoizes_failure() {
        let handle = CatalogHandle::from_json("not json");

        let first = handle.get().await.unwrap_err();
        let second = handle.get().await.unwrap_err();

        assert!(matches!(first, GatewayError::ConfigParse(_)));
        assert_eq!(first.to_string(), second.to_string());
    }

    #[tokio::test]
    async fn test_handle_failure_message_not_double_prefixed() {
        let handle = CatalogHandle::from_json("not json");
        let err = handle.get().await.unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.starts_with("Config parse error: Failed to parse catalog JSON"));
        assert_eq!(rendered.matches("Config parse error").count(), 1);
    }

    #[tokio::test]
    async fn test_handle_reset_reloads_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();
        file.flush().unwrap();

        let mut handle = CatalogHandle::from_path(file.path());
        assert!(handle.get().await.unwrap().is_empty());

        std::fs::write(file.path(), ONE_QUERY).unwrap();
        assert!(handle.get().await.unwrap().is_empty());

        handle.reset();
        assert_eq!(handle.get().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_from_catalog() {
        let handle = CatalogHandle::from_catalog(Catalog::default());
        assert!(handle.get().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_handle_concurrent_first_access() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(ONE_QUERY.as_bytes()).unwrap();
        file.flush().unwrap();
        let handle = Arc::new(CatalogHandle::from_path(file.path()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let handle = Arc::clone(&handle);
                tokio::spawn(async move { handle.get().await.unwrap() })
            })
            .collect();

        let mut catalogs = Vec::new();
        for task in tasks {
            catalogs.push(task.await.unwrap());
        }
        for catalog in &catalogs[1..] {
            assert!(Arc::ptr_eq(&catalogs[0], catalog));
        }
        assert_eq!(catalogs[0].len(), 1);
    }
}
