//! Subcommand implementations

use crate::config::ExtractConfig;
use anyhow::{Context, Result};
use jimage::{Extraction, Session, Traversal};
use std::fs;
use std::path::{Component, Path};

/// Print the header of the image at `path`
pub fn info(path: &Path) -> Result<()> {
    let session = Session::open_path(path)
        .with_context(|| format!("cannot open image {}", path.display()))?;
    let header = session.header();

    println!("image:      {}", path.display());
    println!("version:    {}.{}", header.major_version, header.minor_version);
    println!("byte order: {:?}", header.endian);
    println!("resources:  {}", header.resource_count);
    println!("table:      {} slots", header.table_length);
    println!("index size: {} bytes", header.index_size());
    Ok(())
}

/// Open the configured image and build its catalog
pub fn build(config: &ExtractConfig) -> Result<Extraction> {
    let path = &config.image_path;
    let mut session = Session::open_path(path)
        .with_context(|| format!("cannot open image {}", path.display()))?;

    let extraction = config
        .catalog_builder()
        .build(&mut session)
        .with_context(|| format!("cannot catalog {}", path.display()))?;

    let report = &extraction.report;
    tracing::info!(
        entries = extraction.catalog.len(),
        bytes = extraction.catalog.total_bytes(),
        matched = report.matched,
        stopped = extraction.traversal == Traversal::Stopped,
        "catalog built"
    );
    if !report.is_lossless() {
        tracing::warn!(
            not_found = report.not_found_count(),
            read_failures = report.read_failure_count(),
            duplicates = report.duplicate_count(),
            replaced = report.replaced.len(),
            "some selected entries are missing from the catalog"
        );
    }
    Ok(extraction)
}

/// Print every catalog key with its size
pub fn list(config: &ExtractConfig) -> Result<()> {
    let extraction = build(config)?;
    for (key, bytes) in extraction.catalog.iter() {
        println!("{}\t{}", bytes.len(), key);
    }
    Ok(())
}

/// Write every catalog entry below `out`, one file per key
pub fn extract(config: &ExtractConfig, out: &Path) -> Result<()> {
    let extraction = build(config)?;
    let mut written = 0usize;

    for (key, bytes) in extraction.catalog.iter() {
        let relative = Path::new(key.trim_start_matches('/'));
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            tracing::warn!(key, "key does not map to a safe relative path, skipped");
            continue;
        }

        let dest = out.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        fs::write(&dest, bytes).with_context(|| format!("cannot write {}", dest.display()))?;
        written += 1;
    }

    tracing::info!(files = written, out = %out.display(), "extraction written");
    Ok(())
}
