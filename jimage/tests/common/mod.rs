//! Common test utilities and mock block devices

pub mod builder;
pub use builder::ImageBuilder;

use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use jimage::{
    ExtractError, JImageError, LocationRef, PathSpec, ResourceBuffer, ResourceEntry,
    ResourceSource, Session, Traversal, Visit,
};
use std::cell::RefCell;
use std::io;
use std::sync::Arc;

/// In-memory block device for testing
#[derive(Debug, Clone)]
pub struct MemoryBlockDevice {
    pub data: Vec<u8>,
    pub block_size: usize,
    /// Number of `read_blocks` calls served
    pub reads: usize,
}

impl MemoryBlockDevice {
    /// Create a new memory block device, zero padding to whole blocks
    pub fn new(mut data: Vec<u8>) -> Self {
        let block_size = 512;
        let padded = data.len().div_ceil(block_size) * block_size;
        data.resize(padded, 0);
        Self {
            data,
            block_size,
            reads: 0,
        }
    }
}

impl BlockIo for MemoryBlockDevice {
    type Error = io::Error;

    fn block_size(&self) -> BlockSize {
        BlockSize::new(self.block_size as u32).expect("valid block size")
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok((self.data.len() / self.block_size) as u64)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        self.reads += 1;
        let offset = start_lba.0 as usize * self.block_size;
        if offset + dst.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read beyond end of device",
            ));
        }
        dst.copy_from_slice(&self.data[offset..offset + dst.len()]);
        Ok(())
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        let offset = start_lba.0 as usize * self.block_size;
        if offset + src.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "write beyond end of device",
            ));
        }
        self.data[offset..offset + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Session wrapper that records every resolve and read
///
/// Reads are checked against the declared size of the reference they were
/// issued with; the assertion must never trip.
#[allow(dead_code)]
pub struct RecordingSource {
    pub session: Session<MemoryBlockDevice>,
    pub resolves: RefCell<Vec<String>>,
    pub reads: Vec<String>,
    /// Image names that resolve to nothing
    pub hidden: Vec<String>,
    /// Image names whose read fails
    pub failing: Vec<String>,
}

#[allow(dead_code)]
impl RecordingSource {
    pub fn open(device: MemoryBlockDevice) -> Self {
        Self {
            session: Session::open(device).expect("open image"),
            resolves: RefCell::new(Vec::new()),
            reads: Vec::new(),
            hidden: Vec::new(),
            failing: Vec::new(),
        }
    }

    pub fn hide(mut self, name: &str) -> Self {
        self.hidden.push(name.to_string());
        self
    }

    pub fn fail_read(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    pub fn resolve_count(&self) -> usize {
        self.resolves.borrow().len()
    }
}

impl ResourceSource for RecordingSource {
    fn iterate<F>(&mut self, mut visitor: F) -> Result<Traversal, ExtractError>
    where
        F: FnMut(&mut Self, &ResourceEntry<'_>) -> Visit,
    {
        let index = Arc::clone(self.session.index());
        for entry in index.entries() {
            let entry = entry.map_err(ExtractError::Iteration)?;
            if visitor(self, &entry) == Visit::Stop {
                return Ok(Traversal::Stopped);
            }
        }
        Ok(Traversal::Completed)
    }

    fn resolve(&self, spec: &PathSpec<'_>) -> Option<LocationRef> {
        let name = spec.image_name();
        self.resolves.borrow_mut().push(name.clone());
        if self.hidden.contains(&name) {
            return None;
        }
        self.session.resolve(spec)
    }

    fn read(&mut self, location: &LocationRef) -> jimage::Result<ResourceBuffer> {
        self.reads.push(location.name().to_string());
        if self.failing.iter().any(|n| n == location.name()) {
            return Err(JImageError::IoError);
        }
        let buffer = self.session.read(location)?;
        assert!(
            buffer.len() as u64 >= location.size(),
            "read destination smaller than declared size"
        );
        Ok(buffer)
    }
}
