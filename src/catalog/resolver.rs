//! Entry lookup by (type, key)
//!
//! Lookups scan in load order and stop at the first match, so a later entry that
//! repeats an earlier (type, key) pair can never be returned.

use super::entry::{CatalogEntry, EntryType};

/// First entry whose type and key both match, or `None`
pub fn find_by_type_and_key<'a>(
    entries: &'a [CatalogEntry],
    entry_type: EntryType,
    key: &str,
) -> Option<&'a CatalogEntry> {
    entries
        .iter()
        .find(|entry| entry.entry_type() == entry_type && entry.key == key)
}
