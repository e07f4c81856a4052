//! Location attribute decoding
//!
//! A location is a run of `(header, value)` pairs closed by a zero header
//! byte. The header's upper five bits name the attribute kind, the lower
//! three hold the value length minus one. Values are big-endian regardless
//! of the index byte order.

use crate::error::{JImageError, Result};
use crate::index::strings::StringTable;
use crate::types::AttributeKind;
use alloc::string::String;

/// Decoded attribute values, indexed by [`AttributeKind`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationAttributes {
    values: [u64; AttributeKind::COUNT],
}

impl LocationAttributes {
    /// Decode the attribute stream beginning at `offset` within `locations`
    pub fn decode(locations: &[u8], offset: u32) -> Result<Self> {
        let corrupt = || JImageError::CorruptLocation(offset);
        let mut values = [0u64; AttributeKind::COUNT];
        let mut pos = offset as usize;

        loop {
            let header = *locations.get(pos).ok_or_else(corrupt)?;
            if header == AttributeKind::End as u8 {
                break;
            }

            let kind = (header >> 3) as usize;
            let len = (header & 0x07) as usize + 1;
            if kind >= AttributeKind::COUNT {
                return Err(corrupt());
            }

            let raw = locations.get(pos + 1..pos + 1 + len).ok_or_else(corrupt)?;
            values[kind] = raw.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
            pos += 1 + len;
        }

        Ok(Self { values })
    }

    /// Raw value of one attribute, zero when absent
    pub fn get(&self, kind: AttributeKind) -> u64 {
        self.values[kind as usize]
    }
}

/// A decoded location with its name parts resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    /// Raw attributes
    pub attributes: LocationAttributes,
    /// Owning module
    pub module: &'a str,
    /// Package directory, `/` separated
    pub parent: &'a str,
    /// Base name
    pub base: &'a str,
    /// Extension without dot
    pub extension: &'a str,
}

impl<'a> Location<'a> {
    /// Resolve the string attributes of `attributes`
    pub fn resolve(attributes: LocationAttributes, strings: StringTable<'a>) -> Result<Self> {
        Ok(Self {
            attributes,
            module: strings.get(attributes.get(AttributeKind::Module))?,
            parent: strings.get(attributes.get(AttributeKind::Parent))?,
            base: strings.get(attributes.get(AttributeKind::Base))?,
            extension: strings.get(attributes.get(AttributeKind::Extension))?,
        })
    }

    /// Content offset relative to the end of the index
    pub fn content_offset(&self) -> u64 {
        self.attributes.get(AttributeKind::Offset)
    }

    /// Stored size when compressed, zero otherwise
    pub fn compressed_size(&self) -> u64 {
        self.attributes.get(AttributeKind::Compressed)
    }

    /// Size of the resource content
    pub fn uncompressed_size(&self) -> u64 {
        self.attributes.get(AttributeKind::Uncompressed)
    }

    /// Full image name, e.g. `/java.base/java/lang/String.class`
    pub fn full_name(&self) -> String {
        let mut name = String::new();
        if !self.module.is_empty() {
            name.push('/');
            name.push_str(self.module);
            name.push('/');
        }
        if !self.parent.is_empty() {
            name.push_str(self.parent);
            name.push('/');
        }
        name.push_str(self.base);
        if !self.extension.is_empty() {
            name.push('.');
            name.push_str(self.extension);
        }
        name
    }
}
