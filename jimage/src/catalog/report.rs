//! Per-build accounting of selected, stored and skipped entries

use crate::error::JImageError;
use alloc::string::String;
use alloc::vec::Vec;

/// Why a selected entry did not make it into the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Traversal announced the entry but resolution found nothing
    NotFound,
    /// Resolution succeeded but reading failed
    Read(JImageError),
    /// Key already present under [`DuplicatePolicy::Reject`](super::DuplicatePolicy::Reject)
    Duplicate,
}

/// One skipped entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Module the entry belongs to
    pub module: String,
    /// Catalog key the entry would have had
    pub key: String,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Counters and details of a catalog build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Entries seen during traversal
    pub visited: usize,
    /// Entries whose extension matched the filter
    pub matched: usize,
    /// New keys stored
    pub inserted: usize,
    /// Keys whose buffer was overwritten by a later entry
    pub replaced: Vec<String>,
    /// Selected entries left out of the catalog
    pub skipped: Vec<SkippedEntry>,
}

impl ExtractionReport {
    pub(crate) fn skip(&mut self, module: &str, key: String, reason: SkipReason) {
        self.skipped.push(SkippedEntry {
            module: String::from(module),
            key,
            reason,
        });
    }

    /// Entries that failed to resolve
    pub fn not_found_count(&self) -> usize {
        self.count(|r| matches!(r, SkipReason::NotFound))
    }

    /// Entries whose read failed
    pub fn read_failure_count(&self) -> usize {
        self.count(|r| matches!(r, SkipReason::Read(_)))
    }

    /// Entries dropped as duplicates
    pub fn duplicate_count(&self) -> usize {
        self.count(|r| matches!(r, SkipReason::Duplicate))
    }

    /// True when every selected entry ended up in the catalog unreplaced
    pub fn is_lossless(&self) -> bool {
        self.skipped.is_empty() && self.replaced.is_empty()
    }

    fn count(&self, pred: impl Fn(&SkipReason) -> bool) -> usize {
        self.skipped.iter().filter(|s| pred(&s.reason)).count()
    }
}
