//! Catalog - schema and query definitions loaded from JSON
//!
//! Entries are validated at load time, kept in load order, and resolved by
//! (type, key) with first-match semantics.

mod entry;
mod handle;
mod resolver;
mod store;

pub use entry::{CatalogEntry, EntryBody, EntryType, QueryEntry, SchemaEntry};
pub use handle::{CatalogHandle, CatalogSource};
pub use resolver::find_by_type_and_key;
pub use store::Catalog;
