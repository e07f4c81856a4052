//! In-memory image index
//!
//! The whole index (redirect table, offsets table, location attributes and
//! string table) is loaded once when a session opens. Lookups and entry
//! enumeration never touch the device afterwards.

pub mod location;
pub mod strings;

use crate::device::ByteDevice;
use crate::error::{JImageError, Result};
use crate::header::ImageHeader;
use crate::resource::ResourceEntry;
use crate::types::{DIRECTORY_MODULES, ENTRY_VERSION, HEADER_SIZE};
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;
use location::{Location, LocationAttributes};
use strings::{hash_code, StringTable, HASH_MULTIPLIER};

/// Header plus index tables of an open image
#[derive(Debug, Clone)]
pub struct ImageIndex {
    header: ImageHeader,
    /// Index bytes following the header
    tables: Vec<u8>,
}

impl ImageIndex {
    /// Read and validate the header and index tables from `device`
    pub fn load<B: BlockIo>(device: &mut ByteDevice<B>) -> Result<Self> {
        if device.len() < HEADER_SIZE as u64 {
            return Err(JImageError::TruncatedIndex);
        }

        let mut raw_header = [0u8; HEADER_SIZE];
        device.read_at(0, &mut raw_header)?;
        let header = ImageHeader::parse(&raw_header)?;

        let index_size = header.index_size();
        if index_size > device.len() {
            return Err(JImageError::TruncatedIndex);
        }

        let mut tables = zeroed(index_size - HEADER_SIZE as u64)?;
        device.read_at(HEADER_SIZE as u64, &mut tables)?;

        tracing::debug!(
            table_length = header.table_length,
            resources = header.resource_count,
            index_size,
            "image index loaded"
        );

        Ok(Self { header, tables })
    }

    /// Image header
    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    /// Number of location slots
    pub fn table_length(&self) -> u32 {
        self.header.table_length
    }

    fn section(&self, start: u64, len: u64) -> &[u8] {
        let start = (start - HEADER_SIZE as u64) as usize;
        &self.tables[start..start + len as usize]
    }

    fn redirect(&self, slot: u32) -> i32 {
        let table = self.section(self.header.redirect_offset(), self.table_length() as u64 * 4);
        self.header
            .endian
            .i32_at(table, slot as usize * 4)
            .unwrap_or(0)
    }

    fn location_offset(&self, slot: u32) -> Result<u32> {
        let table = self.section(self.header.offsets_offset(), self.table_length() as u64 * 4);
        self.header
            .endian
            .u32_at(table, slot as usize * 4)
            .ok_or(JImageError::CorruptLocation(slot))
    }

    fn locations(&self) -> &[u8] {
        self.section(self.header.locations_offset(), self.header.locations_size as u64)
    }

    fn strings(&self) -> StringTable<'_> {
        StringTable::new(self.section(self.header.strings_offset(), self.header.strings_size as u64))
    }

    /// Decode the location stored in `slot`
    pub fn location(&self, slot: u32) -> Result<Location<'_>> {
        let offset = self.location_offset(slot)?;
        let attributes = LocationAttributes::decode(self.locations(), offset)?;
        Location::resolve(attributes, self.strings())
    }

    /// Slot the redirect table assigns to `name`, without verification
    pub fn find_slot(&self, name: &str) -> Option<u32> {
        let length = self.table_length();
        if length == 0 {
            return None;
        }

        let bucket = hash_code(name, HASH_MULTIPLIER) as u32 % length;
        match self.redirect(bucket) {
            0 => None,
            seed if seed > 0 => Some(hash_code(name, seed) as u32 % length),
            slot => u32::try_from(-1i64 - slot as i64)
                .ok()
                .filter(|&s| s < length),
        }
    }

    /// Find the location whose full name is `name`
    ///
    /// The hash only narrows the search to one slot; the location is
    /// accepted only when its rebuilt name matches exactly.
    pub fn lookup(&self, name: &str) -> Option<(u32, Location<'_>)> {
        let slot = self.find_slot(name)?;
        let location = self.location(slot).ok()?;
        (location.full_name() == name).then_some((slot, location))
    }

    /// Resource entries in table order, directory nodes skipped
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            index: self,
            slot: 0,
            failed: false,
        }
    }
}

/// Iterator over resource entries of an [`ImageIndex`]
///
/// Stops after the first decoding error.
pub struct Entries<'a> {
    index: &'a ImageIndex,
    slot: u32,
    failed: bool,
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<ResourceEntry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.failed && self.slot < self.index.table_length() {
            let slot = self.slot;
            self.slot += 1;

            let location = match self.index.location(slot) {
                Ok(location) => location,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            };

            if location.module.is_empty() || DIRECTORY_MODULES.contains(&location.module) {
                continue;
            }

            return Some(Ok(ResourceEntry {
                module: location.module,
                version: ENTRY_VERSION,
                package: location.parent,
                name: location.base,
                extension: location.extension,
            }));
        }
        None
    }
}

/// Allocate a zeroed buffer, failing instead of aborting on huge sizes
pub(crate) fn zeroed(size: u64) -> Result<Vec<u8>> {
    let len = usize::try_from(size).map_err(|_| JImageError::AllocationFailed(size))?;
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(len)
        .map_err(|_| JImageError::AllocationFailed(size))?;
    bytes.extend(core::iter::repeat(0u8).take(len));
    Ok(bytes)
}
