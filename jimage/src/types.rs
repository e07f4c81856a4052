//! Common types and constants for module images

/// Image magic as read in the image's own byte order
pub const IMAGE_MAGIC: u32 = 0xCAFE_DADA;

/// Supported major format version
pub const MAJOR_VERSION: u16 = 1;

/// Supported minor format version
pub const MINOR_VERSION: u16 = 0;

/// Fixed header size (seven 32-bit words)
pub const HEADER_SIZE: usize = 7 * 4;

/// Version label reported for every entry; images hold a single version
pub const ENTRY_VERSION: &str = "9.0";

/// Pseudo modules holding directory nodes rather than resources
pub const DIRECTORY_MODULES: [&str; 2] = ["modules", "packages"];

/// Location attribute kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AttributeKind {
    /// End of attribute stream
    End = 0,
    /// Module name (string offset)
    Module = 1,
    /// Parent path, the package directory (string offset)
    Parent = 2,
    /// Base name without extension (string offset)
    Base = 3,
    /// Extension without dot (string offset)
    Extension = 4,
    /// Content offset relative to the end of the index
    Offset = 5,
    /// Stored size when compressed, zero otherwise
    Compressed = 6,
    /// Size of the resource content
    Uncompressed = 7,
}

impl AttributeKind {
    /// Number of attribute kinds
    pub const COUNT: usize = 8;
}

/// Byte order of the image index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Little-endian (x86, aarch64 builds)
    Little,
    /// Big-endian (s390x, sparc builds)
    Big,
}

impl Endian {
    /// Read a 32-bit word at `at`
    pub fn u32_at(self, bytes: &[u8], at: usize) -> Option<u32> {
        let raw: [u8; 4] = bytes.get(at..at.checked_add(4)?)?.try_into().ok()?;
        Some(match self {
            Self::Little => u32::from_le_bytes(raw),
            Self::Big => u32::from_be_bytes(raw),
        })
    }

    /// Read a signed 32-bit word at `at`
    pub fn i32_at(self, bytes: &[u8], at: usize) -> Option<i32> {
        self.u32_at(bytes, at).map(|v| v as i32)
    }
}
