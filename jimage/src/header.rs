//! Image header parsing
//!
//! The header is seven 32-bit words at offset 0. Its byte order is not fixed:
//! the magic is read both ways and whichever matches decides the order for
//! the whole index.

use crate::error::{JImageError, Result};
use crate::types::{Endian, HEADER_SIZE, IMAGE_MAGIC, MAJOR_VERSION, MINOR_VERSION};

/// Parsed image header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    /// Byte order of the index
    pub endian: Endian,

    /// Major format version
    pub major_version: u16,

    /// Minor format version
    pub minor_version: u16,

    /// Header flags (unused by readers)
    pub flags: u32,

    /// Number of resources stored
    pub resource_count: u32,

    /// Entries in the redirect and offsets tables
    pub table_length: u32,

    /// Bytes in the location attribute stream
    pub locations_size: u32,

    /// Bytes in the string table
    pub strings_size: u32,
}

impl ImageHeader {
    /// Parse a header from the first [`HEADER_SIZE`] bytes of an image
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(JImageError::TruncatedIndex);
        }

        let endian = detect_endian(data)?;
        let word = |index: usize| {
            endian
                .u32_at(data, index * 4)
                .ok_or(JImageError::TruncatedIndex)
        };

        let version = word(1)?;
        let major_version = (version >> 16) as u16;
        let minor_version = (version & 0xFFFF) as u16;
        if major_version != MAJOR_VERSION || minor_version != MINOR_VERSION {
            return Err(JImageError::UnsupportedVersion {
                major: major_version,
                minor: minor_version,
            });
        }

        Ok(Self {
            endian,
            major_version,
            minor_version,
            flags: word(2)?,
            resource_count: word(3)?,
            table_length: word(4)?,
            locations_size: word(5)?,
            strings_size: word(6)?,
        })
    }

    /// Byte offset of the redirect table
    pub fn redirect_offset(&self) -> u64 {
        HEADER_SIZE as u64
    }

    /// Byte offset of the offsets table
    pub fn offsets_offset(&self) -> u64 {
        self.redirect_offset() + self.table_length as u64 * 4
    }

    /// Byte offset of the location attribute stream
    pub fn locations_offset(&self) -> u64 {
        self.offsets_offset() + self.table_length as u64 * 4
    }

    /// Byte offset of the string table
    pub fn strings_offset(&self) -> u64 {
        self.locations_offset() + self.locations_size as u64
    }

    /// Total index size; resource content starts here
    pub fn index_size(&self) -> u64 {
        self.strings_offset() + self.strings_size as u64
    }
}

fn detect_endian(data: &[u8]) -> Result<Endian> {
    let little = Endian::Little
        .u32_at(data, 0)
        .ok_or(JImageError::TruncatedIndex)?;
    if little == IMAGE_MAGIC {
        Ok(Endian::Little)
    } else if little.swap_bytes() == IMAGE_MAGIC {
        Ok(Endian::Big)
    } else {
        Err(JImageError::InvalidMagic(little))
    }
}
