//! Catalog loading from a JSON array
//!
//! Every element must decode into a schema or query entry or the whole load fails.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{GatewayError, Result};

use super::entry::{CatalogEntry, EntryType, QueryEntry, SchemaEntry};
use super::resolver;

/// JSON representation of one catalog element
#[derive(Debug, Deserialize)]
struct JsonEntry {
    #[serde(rename = "type")]
    entry_type: String,
    key: String,
    data: Value,
}

/// Ordered, immutable collection of catalog entries
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog from already-validated entries, keeping their order
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Load catalog from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::ConfigParse(format!(
                "Failed to read catalog file {}: {}",
                path.display(),
                e
            ))
        })?;
        let catalog = Self::from_json(&content)?;
        log::info!(
            "Loaded {} catalog entries from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Load catalog from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let elements: Vec<JsonEntry> = serde_json::from_str(content)
            .map_err(|e| GatewayError::ConfigParse(format!("Failed to parse catalog JSON: {}", e)))?;

        let entries = elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| Self::convert_json_entry(index, element))
            .collect::<Result<Vec<_>>>()?;

        let catalog = Self { entries };
        for (entry_type, key) in catalog.shadowed() {
            log::warn!(
                "Duplicate {} entry '{}' is unreachable; the first definition wins",
                entry_type,
                key
            );
        }
        Ok(catalog)
    }

    /// Convert one JSON element to a typed entry
    fn convert_json_entry(index: usize, element: JsonEntry) -> Result<CatalogEntry> {
        let JsonEntry {
            entry_type,
            key,
            data,
        } = element;

        let entry_type = EntryType::from_str(&entry_type).ok_or_else(|| {
            GatewayError::ConfigParse(format!(
                "Entry {} ('{}'): unrecognized type '{}'",
                index, key, entry_type
            ))
        })?;

        let invalid = |e: serde_json::Error| {
            GatewayError::ConfigParse(format!(
                "Entry {} ('{}'): invalid {} data: {}",
                index, key, entry_type, e
            ))
        };

        let entry = match entry_type {
            EntryType::Schema => {
                let data: SchemaEntry = serde_json::from_value(data).map_err(invalid)?;
                CatalogEntry::schema(key, data)
            }
            EntryType::Query => {
                let data: QueryEntry = serde_json::from_value(data).map_err(invalid)?;
                CatalogEntry::query(key, data)
            }
        };

        Ok(entry)
    }

    /// First entry matching `entry_type` and `key` in load order
    pub fn find(&self, entry_type: EntryType, key: &str) -> Option<&CatalogEntry> {
        resolver::find_by_type_and_key(&self.entries, entry_type, key)
    }

    /// First schema entry named `key`
    pub fn find_schema(&self, key: &str) -> Option<&SchemaEntry> {
        self.find(EntryType::Schema, key).and_then(CatalogEntry::as_schema)
    }

    /// First query entry named `key`
    pub fn find_query(&self, key: &str) -> Option<&QueryEntry> {
        self.find(EntryType::Query, key).and_then(CatalogEntry::as_query)
    }

    /// (type, key) pairs defined more than once, in order of the shadowed copy
    pub fn shadowed(&self) -> Vec<(EntryType, &str)> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|entry| !seen.insert((entry.entry_type(), entry.key.as_str())))
            .map(|entry| (entry.entry_type(), entry.key.as_str()))
            .collect()
    }

    /// All entries in load order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries of one type in load order
    pub fn by_type(&self, entry_type: EntryType) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.entry_type() == entry_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
