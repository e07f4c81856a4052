//! Catalog construction from one traversal
//!
//! Every selected entry goes through exactly one resolve and one read, both
//! derived from the entry being visited. Per-entry failures are recorded in
//! the [`ExtractionReport`] and the walk continues; only a traversal failure
//! aborts the build, and then the partial catalog is dropped.

use super::{Catalog, DuplicatePolicy, ExtensionFilter, ExtractionReport, Insertion, KeyStyle, SkipReason};
use crate::error::ExtractError;
use crate::resource::ResourceEntry;
use crate::session::{ResourceSource, Traversal, Visit};
use alloc::string::String;

/// Result of a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// The finished, read-only catalog
    pub catalog: Catalog,
    /// What was selected, stored and skipped
    pub report: ExtractionReport,
    /// Whether the walk ran to the end or was stopped
    pub traversal: Traversal,
}

/// Configures and runs a single catalog build
///
/// `build` consumes the builder, so one builder performs one traversal.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    filter: ExtensionFilter,
    module: Option<String>,
    key_style: KeyStyle,
    policy: DuplicatePolicy,
    limit: Option<usize>,
}

impl CatalogBuilder {
    /// Select entries by extension
    pub fn new(filter: ExtensionFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Only consider entries of one module
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Choose how keys are formed
    pub fn with_key_style(mut self, key_style: KeyStyle) -> Self {
        self.key_style = key_style;
        self
    }

    /// Choose what happens on key collisions
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stop the traversal once the catalog holds `limit` entries
    ///
    /// The build then reports [`Traversal::Stopped`], even when the entry
    /// that filled the catalog was the last one.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn selects(&self, entry: &ResourceEntry<'_>) -> bool {
        self.filter.matches(entry.extension)
            && self.module.as_deref().map_or(true, |m| m == entry.module)
    }

    fn limit_reached(&self, catalog: &Catalog) -> bool {
        self.limit.is_some_and(|limit| catalog.len() >= limit)
    }

    /// Walk `source` once and collect every selected resource
    pub fn build<S: ResourceSource>(self, source: &mut S) -> Result<Extraction, ExtractError> {
        let mut catalog = Catalog::default();
        let mut report = ExtractionReport::default();

        tracing::debug!(
            filter = %self.filter,
            module = self.module.as_deref().unwrap_or("*"),
            "catalog build started"
        );

        let walk = source.iterate(|source, entry| {
            if self.limit_reached(&catalog) {
                return Visit::Stop;
            }

            report.visited += 1;
            if !self.selects(entry) {
                return Visit::Continue;
            }
            report.matched += 1;

            let key = self.key_style.key_for(entry);
            let Some(location) = source.resolve(&entry.path_spec()) else {
                tracing::warn!(module = entry.module, %key, "announced entry did not resolve");
                report.skip(entry.module, key, SkipReason::NotFound);
                return Visit::Continue;
            };

            let buffer = match source.read(&location) {
                Ok(buffer) => buffer,
                Err(err) => {
                    tracing::warn!(module = entry.module, %key, %err, "resource read failed");
                    report.skip(entry.module, key, SkipReason::Read(err));
                    return Visit::Continue;
                }
            };

            match catalog.insert(key.clone(), buffer, self.policy) {
                Insertion::Inserted => report.inserted += 1,
                Insertion::Replaced => {
                    tracing::warn!(module = entry.module, %key, "duplicate key overwritten");
                    report.replaced.push(key);
                }
                Insertion::Rejected => {
                    tracing::warn!(module = entry.module, %key, "duplicate key rejected");
                    report.skip(entry.module, key, SkipReason::Duplicate);
                }
            }

            if self.limit_reached(&catalog) {
                tracing::debug!(entries = catalog.len(), "catalog limit reached");
                return Visit::Stop;
            }
            Visit::Continue
        });

        let traversal = match walk {
            Ok(traversal) => traversal,
            Err(err) => {
                tracing::warn!(%err, discarded = catalog.len(), "catalog build failed");
                return Err(err);
            }
        };

        tracing::debug!(
            ?traversal,
            entries = catalog.len(),
            bytes = catalog.total_bytes(),
            skipped = report.skipped.len(),
            "catalog build finished"
        );

        Ok(Extraction {
            catalog,
            report,
            traversal,
        })
    }
}
