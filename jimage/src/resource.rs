//! Resource identities, location references and owned content buffers

use crate::error::{JImageError, Result};
use crate::index::location::Location;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// One resource announced by a traversal
///
/// Borrowed from the session's index for the duration of a single visit.
/// Copy the fields out if they must outlive the visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceEntry<'a> {
    /// Owning module, e.g. `java.base`
    pub module: &'a str,
    /// Module version label
    pub version: &'a str,
    /// Package directory, `/` separated, e.g. `java/lang`
    pub package: &'a str,
    /// Base name, e.g. `String`
    pub name: &'a str,
    /// Extension without dot, e.g. `class`
    pub extension: &'a str,
}

impl ResourceEntry<'_> {
    /// Resource path within the module, e.g. `java/lang/String.class`
    pub fn resource_path(&self) -> String {
        join_path(self.package, self.name, self.extension)
    }

    /// Lookup request for this very entry
    pub fn path_spec(&self) -> PathSpec<'_> {
        PathSpec {
            module: self.module,
            version: self.version,
            path: self.resource_path(),
        }
    }
}

/// `package/name.extension`, dropping empty parts
pub(crate) fn join_path(package: &str, name: &str, extension: &str) -> String {
    let mut path = String::with_capacity(package.len() + name.len() + extension.len() + 2);
    if !package.is_empty() {
        path.push_str(package);
        path.push('/');
    }
    path.push_str(name);
    if !extension.is_empty() {
        path.push('.');
        path.push_str(extension);
    }
    path
}

/// Symbolic lookup request: module, version and resource path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec<'a> {
    /// Owning module
    pub module: &'a str,
    /// Version label; images hold one version so it does not narrow lookup
    pub version: &'a str,
    /// Resource path within the module
    pub path: String,
}

impl<'a> PathSpec<'a> {
    /// Build a request from explicit parts
    pub fn new(module: &'a str, version: &'a str, path: impl Into<String>) -> Self {
        Self {
            module,
            version,
            path: path.into(),
        }
    }

    /// Full image name, e.g. `/java.base/java/lang/String.class`
    pub fn image_name(&self) -> String {
        let mut name = String::with_capacity(self.module.len() + self.path.len() + 2);
        name.push('/');
        name.push_str(self.module);
        name.push('/');
        name.push_str(self.path.trim_start_matches('/'));
        name
    }
}

/// Where one resource's bytes live inside the image
///
/// Only a session's resolve step issues these, and the size travels with
/// the reference so a read can never be asked for a different byte count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRef {
    name: String,
    slot: u32,
    offset: u64,
    compressed_size: u64,
    size: u64,
}

impl LocationRef {
    pub(crate) fn new(name: String, slot: u32, location: &Location<'_>) -> Self {
        Self {
            name,
            slot,
            offset: location.content_offset(),
            compressed_size: location.compressed_size(),
            size: location.uncompressed_size(),
        }
    }

    /// Full image name this reference was issued for
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index slot of the location
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Content offset relative to the end of the index
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Resource size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the content is stored compressed
    pub fn is_compressed(&self) -> bool {
        self.compressed_size != 0
    }

    /// Stored byte count when compressed
    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }
}

/// Owned content of one resource
///
/// Only constructible at the exact size of a [`LocationRef`], so the fill
/// step always writes into storage that already has room.
#[derive(Clone, PartialEq, Eq)]
pub struct ResourceBuffer {
    bytes: Vec<u8>,
}

impl ResourceBuffer {
    /// Zeroed buffer of exactly `location.size()` bytes
    pub(crate) fn sized_for(location: &LocationRef) -> Result<Self> {
        Ok(Self {
            bytes: crate::index::zeroed(location.size())?,
        })
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the resource is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the content
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for ResourceBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ResourceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBuffer")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Check a destination against the size a reference declares
pub(crate) fn ensure_capacity(location: &LocationRef, dest: &[u8]) -> Result<()> {
    if (dest.len() as u64) < location.size() {
        return Err(JImageError::BufferTooSmall {
            capacity: dest.len(),
            required: location.size(),
        });
    }
    Ok(())
}
