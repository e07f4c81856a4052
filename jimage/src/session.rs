//! Container session: open, iterate, resolve and read
//!
//! A [`Session`] exclusively owns the block device an image lives on. The
//! index is loaded once at open; iteration and resolution work from memory,
//! only [`ResourceSource::read`] goes back to the device.

use crate::device::ByteDevice;
use crate::error::{ExtractError, JImageError, Result};
use crate::header::ImageHeader;
use crate::index::ImageIndex;
use crate::resource::{ensure_capacity, LocationRef, PathSpec, ResourceBuffer, ResourceEntry};
use alloc::sync::Arc;
use gpt_disk_io::BlockIo;

/// Visitor verdict after one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep going
    Continue,
    /// Halt the traversal after this entry
    Stop,
}

/// How a traversal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Every entry was visited
    Completed,
    /// The visitor asked to stop
    Stopped,
}

/// The open/iterate/resolve/read surface a catalog is built from
pub trait ResourceSource {
    /// Visit every resource entry once, in source order
    ///
    /// The visitor gets the source back so it can resolve and read the entry
    /// it is looking at. Returning [`Visit::Stop`] ends the walk with
    /// [`Traversal::Stopped`]; a driver failure ends it with
    /// [`ExtractError::Iteration`].
    fn iterate<F>(&mut self, visitor: F) -> Result<Traversal, ExtractError>
    where
        F: FnMut(&mut Self, &ResourceEntry<'_>) -> Visit;

    /// Look up a resource by module and path
    fn resolve(&self, spec: &PathSpec<'_>) -> Option<LocationRef>;

    /// Allocate a buffer of exactly the referenced size and fill it
    fn read(&mut self, location: &LocationRef) -> Result<ResourceBuffer>;
}

/// An open module image
#[derive(Debug)]
pub struct Session<B: BlockIo> {
    device: ByteDevice<B>,
    index: Arc<ImageIndex>,
}

impl<B: BlockIo> Session<B> {
    /// Open the image stored on `block_io`
    ///
    /// Fails with [`ExtractError::Open`] when the header or index is
    /// unreadable; no traversal is possible in that case.
    pub fn open(block_io: B) -> Result<Self, ExtractError> {
        let device = ByteDevice::new(block_io).map_err(Self::open_failed)?;
        Self::load(device)
    }

    /// Open an image occupying the first `len` bytes of `block_io`
    ///
    /// Bytes past `len` are treated as absent, so an image cut short inside
    /// its last block fails instead of reading padding.
    pub fn open_with_len(block_io: B, len: u64) -> Result<Self, ExtractError> {
        let device = ByteDevice::with_len(block_io, len).map_err(Self::open_failed)?;
        Self::load(device)
    }

    fn load(mut device: ByteDevice<B>) -> Result<Self, ExtractError> {
        let index = ImageIndex::load(&mut device).map_err(Self::open_failed)?;
        Ok(Self {
            device,
            index: Arc::new(index),
        })
    }

    fn open_failed(reason: JImageError) -> ExtractError {
        tracing::warn!(%reason, code = reason.code(), "image open failed");
        ExtractError::open(reason)
    }

    /// Loaded index
    pub fn index(&self) -> &Arc<ImageIndex> {
        &self.index
    }

    /// Image header
    pub fn header(&self) -> &ImageHeader {
        self.index.header()
    }

    /// Fill `dest` with the bytes `location` refers to
    ///
    /// `dest` must already hold at least `location.size()` bytes; a shorter
    /// destination is rejected before the device is touched.
    ///
    /// # Returns
    /// Number of bytes written
    pub fn read_into(&mut self, location: &LocationRef, dest: &mut [u8]) -> Result<usize> {
        ensure_capacity(location, dest)?;
        let start = self.content_start(location)?;
        let size = location.size() as usize;
        self.device.read_at(start, &mut dest[..size])?;
        Ok(size)
    }

    /// Device offset of the stored bytes, once they are known to be readable
    ///
    /// Rejects compressed content and extents reaching past the image end.
    fn content_start(&self, location: &LocationRef) -> Result<u64> {
        if location.is_compressed() {
            return Err(JImageError::Compressed {
                compressed: location.compressed_size(),
            });
        }

        let start = self
            .index
            .header()
            .index_size()
            .checked_add(location.offset())
            .ok_or(JImageError::ExtentOutOfBounds)?;
        self.device.check_extent(start, location.size())?;
        Ok(start)
    }

    /// Release the session, handing back the device
    pub fn close(self) -> B {
        tracing::debug!("image session closed");
        self.device.into_inner()
    }
}

#[cfg(feature = "std")]
impl Session<crate::device::FileDevice> {
    /// Open the image file at `path`
    ///
    /// The error code is the OS error number when the file cannot be opened.
    /// Reads are bounded by the exact file length.
    pub fn open_path(path: impl AsRef<std::path::Path>) -> Result<Self, ExtractError> {
        use std::io::ErrorKind;

        let path = path.as_ref();
        let device = crate::device::FileDevice::open(path).map_err(|err| {
            tracing::warn!(path = %path.display(), %err, "cannot open image file");
            let reason = match err.kind() {
                ErrorKind::NotFound => JImageError::PathNotFound,
                ErrorKind::PermissionDenied => JImageError::AccessDenied,
                _ => JImageError::IoError,
            };
            ExtractError::Open {
                code: err.raw_os_error().unwrap_or(reason.code()),
                reason,
            }
        })?;

        let len = device.len();
        tracing::debug!(path = %path.display(), bytes = len, "image file opened");
        Self::open_with_len(device, len)
    }
}

impl<B: BlockIo> ResourceSource for Session<B> {
    fn iterate<F>(&mut self, mut visitor: F) -> Result<Traversal, ExtractError>
    where
        F: FnMut(&mut Self, &ResourceEntry<'_>) -> Visit,
    {
        let index = Arc::clone(&self.index);
        for entry in index.entries() {
            let entry = entry.map_err(|reason| {
                tracing::warn!(%reason, "image traversal failed");
                ExtractError::Iteration(reason)
            })?;

            tracing::trace!(
                module = entry.module,
                package = entry.package,
                name = entry.name,
                extension = entry.extension,
                "visit"
            );
            if visitor(self, &entry) == Visit::Stop {
                return Ok(Traversal::Stopped);
            }
        }
        Ok(Traversal::Completed)
    }

    fn resolve(&self, spec: &PathSpec<'_>) -> Option<LocationRef> {
        let name = spec.image_name();
        let (slot, location) = self.index.lookup(&name)?;
        Some(LocationRef::new(name, slot, &location))
    }

    fn read(&mut self, location: &LocationRef) -> Result<ResourceBuffer> {
        // Nothing is allocated for an extent the image cannot hold
        self.content_start(location)?;

        let mut buffer = ResourceBuffer::sized_for(location)?;
        self.read_into(location, buffer.as_mut_slice())?;
        Ok(buffer)
    }
}
