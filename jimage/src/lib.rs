//! Java Runtime Module Image Reader
//!
//! A `no_std` reader for the runtime's consolidated module store (the
//! `lib/modules` jimage file) and a catalog builder that extracts resources
//! from it by extension.
//!
//! # Overview
//!
//! A module image packs every class and resource of a runtime into one file
//! with a hashed index in front. This crate provides:
//! - Header parsing with byte order detection
//! - In-memory index with perfect-hash name lookup
//! - Entry enumeration (module, package, name, extension)
//! - Resource reads into pre-sized owned buffers
//! - Single-pass catalog construction with duplicate and skip reporting
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Device layer** - Byte addressed reads over a [`gpt_disk_io::BlockIo`]
//! 2. **Index layer** - Header, redirect/offset tables, attributes, strings
//! 3. **Session layer** - Open, iterate, resolve, read
//! 4. **Catalog layer** - Filter, resolve+read per entry, uniquely keyed map
//!
//! # Usage
//!
//! ```ignore
//! use jimage::{CatalogBuilder, ExtensionFilter, Session};
//!
//! let mut session = Session::open_path("/usr/lib/jvm/java-17/lib/modules")?;
//! let extraction = CatalogBuilder::new(ExtensionFilter::Class).build(&mut session)?;
//!
//! for (key, bytes) in extraction.catalog.iter() {
//!     println!("{key}: {} bytes", bytes.len());
//! }
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod catalog;
pub mod device;
pub mod error;
pub mod header;
pub mod index;
pub mod resource;
pub mod session;
pub mod types;

pub use catalog::{
    Catalog, CatalogBuilder, DuplicatePolicy, ExtensionFilter, Extraction, ExtractionReport,
    KeyStyle, SkipReason,
};
pub use device::ByteDevice;
pub use error::{ExtractError, JImageError, Result};
pub use resource::{LocationRef, PathSpec, ResourceBuffer, ResourceEntry};
pub use session::{ResourceSource, Session, Traversal, Visit};

#[cfg(feature = "std")]
pub use device::FileDevice;

/// Build a catalog of every resource with the given extension
///
/// Shorthand for [`CatalogBuilder::new`] with default key style and
/// duplicate policy.
pub fn build_catalog<S: ResourceSource>(
    source: &mut S,
    filter: ExtensionFilter,
) -> core::result::Result<Extraction, ExtractError> {
    CatalogBuilder::new(filter).build(source)
}
