//! Error types for image access and catalog extraction

/// Result type for image operations
pub type Result<T, E = JImageError> = core::result::Result<T, E>;

/// Error code for a bad image magic
pub const JIMAGE_BAD_MAGIC: i32 = -1;

/// Error code for an unsupported image version
pub const JIMAGE_BAD_VERSION: i32 = -2;

/// Error code for a structurally corrupted image
pub const JIMAGE_CORRUPTED: i32 = -3;

/// Error code for a device level failure
pub const JIMAGE_IO_ERROR: i32 = -4;

/// Errors that can occur while reading an image
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JImageError {
    /// I/O error reading from the block device
    #[error("I/O error reading image device")]
    IoError,

    /// Image file does not exist
    #[error("image path does not exist")]
    PathNotFound,

    /// Image file exists but cannot be opened
    #[error("access to image denied")]
    AccessDenied,

    /// Header magic is not `0xCAFEDADA` in either byte order
    #[error("invalid image magic {0:#010x}")]
    InvalidMagic(u32),

    /// Header carries a version this reader does not understand
    #[error("unsupported image version {major}.{minor}")]
    UnsupportedVersion {
        /// Major version from the header
        major: u16,
        /// Minor version from the header
        minor: u16,
    },

    /// Header or index tables extend past the end of the device
    #[error("image index is truncated")]
    TruncatedIndex,

    /// Location attribute stream could not be decoded
    #[error("corrupt location attributes at offset {0}")]
    CorruptLocation(u32),

    /// String table offset is out of range or not valid UTF-8
    #[error("invalid string table entry at offset {0}")]
    InvalidString(u64),

    /// No resource exists under the requested name
    #[error("resource not found")]
    NotFound,

    /// Destination is smaller than the resource it should receive
    #[error("destination holds {capacity} bytes, resource needs {required}")]
    BufferTooSmall {
        /// Length of the caller supplied destination
        capacity: usize,
        /// Declared resource size
        required: u64,
    },

    /// Resource content lies outside the device
    #[error("resource extent out of bounds")]
    ExtentOutOfBounds,

    /// Resource is stored compressed
    #[error("resource is compressed ({compressed} bytes stored)")]
    Compressed {
        /// Stored (compressed) byte count
        compressed: u64,
    },

    /// Resource size cannot be allocated on this target
    #[error("resource of {0} bytes cannot be allocated")]
    AllocationFailed(u64),

    /// Extension filter text is empty or malformed
    #[error("invalid extension filter {0:?}")]
    InvalidFilter(alloc::string::String),
}

impl JImageError {
    /// Numeric code in the runtime's jimage convention
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidMagic(_) => JIMAGE_BAD_MAGIC,
            Self::UnsupportedVersion { .. } => JIMAGE_BAD_VERSION,
            Self::IoError | Self::PathNotFound | Self::AccessDenied => JIMAGE_IO_ERROR,
            _ => JIMAGE_CORRUPTED,
        }
    }
}

/// Errors that abort a session or a catalog build
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The image could not be opened; no traversal was attempted
    #[error("failed to open image (code {code}): {reason}")]
    Open {
        /// Code from the underlying open primitive
        code: i32,
        /// What went wrong
        #[source]
        reason: JImageError,
    },

    /// The traversal driver failed part way; partial results are discarded
    #[error("image traversal failed: {0}")]
    Iteration(#[source] JImageError),
}

impl ExtractError {
    /// Wrap a format level failure seen while opening
    pub fn open(reason: JImageError) -> Self {
        Self::Open {
            code: reason.code(),
            reason,
        }
    }

    /// Code carried by this error
    pub fn code(&self) -> i32 {
        match self {
            Self::Open { code, .. } => *code,
            Self::Iteration(reason) => reason.code(),
        }
    }
}
