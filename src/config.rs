use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub catalog: CatalogConfig,
    pub kusto: KustoConfig,
    pub fetch: FetchConfig,
    pub queries: QueriesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: PathBuf,
    /// Load at startup and abort on failure instead of on first use
    pub eager: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./kqlschemas.json"),
            eager: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KustoConfig {
    /// Base URL with a `{cluster}` slot
    pub endpoint_template: String,
    /// Environment variable holding a bearer token
    pub token_env: Option<String>,
    pub timeout_ms: u64,
}

impl Default for KustoConfig {
    fn default() -> Self {
        Self {
            endpoint_template: "https://{cluster}.kusto.windows.net".to_string(),
            token_env: Some("KUSTO_ACCESS_TOKEN".to_string()),
            timeout_ms: 120000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
    pub max_output_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            max_output_bytes: 1000000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueriesConfig {
    /// queryName accepted by the `querykql` tool -> catalog query key
    pub allowed: BTreeMap<String, String>,
}

impl Default for QueriesConfig {
    fn default() -> Self {
        let mut allowed = BTreeMap::new();
        allowed.insert("employeeroles".to_string(), "employeeroles".to_string());
        Self { allowed }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            catalog: CatalogConfig::default(),
            kusto: KustoConfig::default(),
            fetch: FetchConfig::default(),
            queries: QueriesConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config = Self::from_yaml(&content)?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_allows_single_query() {
        let config = Config::default();
        assert_eq!(config.queries.allowed.len(), 1);
        assert_eq!(config.queries.allowed["employeeroles"], "employeeroles");
    }

    #[test]
    fn test_default_catalog_is_lazy() {
        let config = Config::default();
        assert!(!config.catalog.eager);
        assert_eq!(config.catalog.path, PathBuf::from("./kqlschemas.json"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            r#"
catalog:
  path: /etc/kqlgate/catalog.json
kusto:
  timeout_ms: 5000
"#,
        )
        .unwrap();

        assert_eq!(config.catalog.path, PathBuf::from("/etc/kqlgate/catalog.json"));
        assert!(!config.catalog.eager);
        assert_eq!(config.kusto.timeout_ms, 5000);
        assert_eq!(config.kusto.endpoint_template, "https://{cluster}.kusto.windows.net");
        assert_eq!(config.fetch.timeout_ms, 30000);
    }

    #[test]
    fn test_yaml_allow_list_replaces_default() {
        let config = Config::from_yaml(
            r#"
queries:
  allowed:
    roles: employeeroles
    headcount: headcount_by_city
"#,
        )
        .unwrap();

        assert_eq!(config.queries.allowed.len(), 2);
        assert!(!config.queries.allowed.contains_key("employeeroles"));
        assert_eq!(config.queries.allowed["roles"], "employeeroles");
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Config::from_yaml("catalog: [unclosed").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "log_level: debug\n").unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let path = PathBuf::from("/nonexistent/kqlgate.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
