//! Resource catalogs
//!
//! A [`Catalog`] maps a composite resource key to the bytes extracted for
//! it. It is built by a single [`CatalogBuilder`] traversal and read-only
//! once handed out.

pub mod builder;
pub mod filter;
pub mod report;

pub use builder::{CatalogBuilder, Extraction};
pub use filter::ExtensionFilter;
pub use report::{ExtractionReport, SkipReason, SkippedEntry};

use crate::resource::{join_path, ResourceBuffer, ResourceEntry};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// How catalog keys are formed from an entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyStyle {
    /// `package/name.extension`, e.g. `java/lang/String.class`
    #[default]
    Resource,
    /// `/module/package/name.extension`, unique across modules
    ModuleQualified,
}

impl KeyStyle {
    /// Catalog key for `entry`
    pub fn key_for(self, entry: &ResourceEntry<'_>) -> String {
        match self {
            Self::Resource => composite_key(entry.package, entry.name, entry.extension),
            Self::ModuleQualified => {
                let mut key = String::from("/");
                key.push_str(entry.module);
                key.push('/');
                key.push_str(&composite_key(entry.package, entry.name, entry.extension));
                key
            }
        }
    }
}

/// Key made of package, name and extension
pub fn composite_key(package: &str, name: &str, extension: &str) -> String {
    join_path(package, name, extension)
}

/// What happens when a key is inserted twice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the first buffer, report the later one as skipped
    #[default]
    Reject,
    /// Keep the last buffer, report the key as replaced
    Overwrite,
}

/// Outcome of one insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// Key was new
    Inserted,
    /// Key existed and its buffer was replaced
    Replaced,
    /// Key existed and the new buffer was dropped
    Rejected,
}

/// Unique-keyed mapping from resource key to content, ordered by key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, ResourceBuffer>,
}

impl Catalog {
    pub(crate) fn insert(
        &mut self,
        key: String,
        buffer: ResourceBuffer,
        policy: DuplicatePolicy,
    ) -> Insertion {
        use alloc::collections::btree_map::Entry;

        match (self.entries.entry(key), policy) {
            (Entry::Vacant(slot), _) => {
                slot.insert(buffer);
                Insertion::Inserted
            }
            (Entry::Occupied(mut slot), DuplicatePolicy::Overwrite) => {
                slot.insert(buffer);
                Insertion::Replaced
            }
            (Entry::Occupied(_), DuplicatePolicy::Reject) => Insertion::Rejected,
        }
    }

    /// Content stored under `key`
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(ResourceBuffer::as_slice)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> + '_ {
        self.entries
            .iter()
            .map(|(key, buffer)| (key.as_str(), buffer.as_slice()))
    }

    /// Sum of all content lengths
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|b| b.len() as u64).sum()
    }

    /// Take the contents as plain byte vectors
    pub fn into_entries(self) -> BTreeMap<String, Vec<u8>> {
        self.entries
            .into_iter()
            .map(|(key, buffer)| (key, buffer.into_vec()))
            .collect()
    }
}
