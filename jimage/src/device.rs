//! Byte addressed reads on block devices
//!
//! Image structures are not block aligned. Every read is widened to the
//! covering block range, fetched in bounded chunks, and the requested window
//! is copied out.

use crate::error::{JImageError, Result};
use alloc::vec;
use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

/// Upper bound on blocks fetched per device call
const CHUNK_BLOCKS: u64 = 16;

/// Total addressable bytes on the device
pub fn device_len<B: BlockIo>(block_io: &mut B) -> Result<u64> {
    let blocks = block_io.num_blocks().map_err(|err| {
        tracing::debug!(%err, "num_blocks failed");
        JImageError::IoError
    })?;
    blocks
        .checked_mul(block_io.block_size().to_u64())
        .ok_or(JImageError::ExtentOutOfBounds)
}

/// Block device with an exact byte length
///
/// Block devices only report whole blocks. When the image ends inside its
/// last block the padding past `len` is never handed out as image bytes.
#[derive(Debug)]
pub struct ByteDevice<B> {
    block_io: B,
    len: u64,
}

impl<B: BlockIo> ByteDevice<B> {
    /// Every block of `block_io` holds image bytes
    pub fn new(mut block_io: B) -> Result<Self> {
        let len = device_len(&mut block_io)?;
        Ok(Self { block_io, len })
    }

    /// Only the first `len` bytes of `block_io` hold image bytes
    ///
    /// Fails with [`JImageError::ExtentOutOfBounds`] when `len` exceeds the
    /// device capacity.
    pub fn with_len(mut block_io: B, len: u64) -> Result<Self> {
        if len > device_len(&mut block_io)? {
            return Err(JImageError::ExtentOutOfBounds);
        }
        Ok(Self { block_io, len })
    }

    /// Image length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the image holds no bytes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check that `len` bytes at `offset` lie inside the image
    pub fn check_extent(&self, offset: u64, len: u64) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(JImageError::ExtentOutOfBounds),
        }
    }

    /// Fill `dst` with the image bytes starting at `offset`
    pub fn read_at(&mut self, offset: u64, dst: &mut [u8]) -> Result<()> {
        self.check_extent(offset, dst.len() as u64)?;
        read_blocks_at(&mut self.block_io, offset, dst)
    }

    /// Hand back the underlying device
    pub fn into_inner(self) -> B {
        self.block_io
    }
}

/// Copy `dst.len()` bytes at `offset` out of the covering block range
///
/// The caller has already bounds checked the window.
fn read_blocks_at<B: BlockIo>(block_io: &mut B, offset: u64, dst: &mut [u8]) -> Result<()> {
    if dst.is_empty() {
        return Ok(());
    }

    let block_size = block_io.block_size().to_u64();
    let mut lba = offset / block_size;
    let mut skip = (offset % block_size) as usize;

    // Scratch never exceeds one chunk, and small reads stay small
    let needed_blocks = (skip as u64 + dst.len() as u64).div_ceil(block_size);
    let mut scratch = vec![0u8; (needed_blocks.min(CHUNK_BLOCKS) * block_size) as usize];

    let mut written = 0usize;
    while written < dst.len() {
        let remaining = dst.len() - written;
        let blocks = (skip as u64 + remaining as u64)
            .div_ceil(block_size)
            .min(CHUNK_BLOCKS);
        let window = &mut scratch[..(blocks * block_size) as usize];

        block_io.read_blocks(Lba(lba), window).map_err(|err| {
            tracing::debug!(%err, lba, blocks, "read_blocks failed");
            JImageError::IoError
        })?;

        let take = core::cmp::min(window.len() - skip, remaining);
        dst[written..written + take].copy_from_slice(&window[skip..skip + take]);

        written += take;
        lba += blocks;
        skip = 0;
    }

    Ok(())
}

#[cfg(feature = "std")]
pub use file::FileDevice;

#[cfg(feature = "std")]
mod file {
    use gpt_disk_io::BlockIo;
    use gpt_disk_types::{BlockSize, Lba};
    use std::fs::File;
    use std::io::{self, Read, Seek, SeekFrom};
    use std::path::Path;

    /// Read-only file exposed as a block device
    ///
    /// The last block is zero padded when the file length is not a multiple
    /// of the block size. Wrap it with [`ByteDevice::with_len`](super::ByteDevice::with_len)
    /// and [`FileDevice::len`] so the padding is not read as file content.
    #[derive(Debug)]
    pub struct FileDevice {
        file: File,
        len: u64,
        block_size: BlockSize,
    }

    impl FileDevice {
        /// Block size presented to readers
        pub const BLOCK_SIZE: u32 = 4096;

        /// Open `path` for reading
        pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
            let file = File::open(path)?;
            let len = file.metadata()?.len();
            let block_size = BlockSize::new(Self::BLOCK_SIZE)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "bad block size"))?;
            Ok(Self {
                file,
                len,
                block_size,
            })
        }

        /// Exact file length in bytes
        pub fn len(&self) -> u64 {
            self.len
        }

        /// Whether the file is empty
        pub fn is_empty(&self) -> bool {
            self.len == 0
        }
    }

    impl BlockIo for FileDevice {
        type Error = io::Error;

        fn block_size(&self) -> BlockSize {
            self.block_size
        }

        fn num_blocks(&mut self) -> Result<u64, Self::Error> {
            Ok(self.len.div_ceil(self.block_size.to_u64()))
        }

        fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
            let block_size = self.block_size.to_u64();
            if dst.len() as u64 % block_size != 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "buffer is not a whole number of blocks",
                ));
            }

            let offset = start_lba.0 * block_size;
            if offset + dst.len() as u64 > self.len.div_ceil(block_size) * block_size {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "read beyond end of device",
                ));
            }

            let available = self.len.saturating_sub(offset).min(dst.len() as u64) as usize;
            self.file.seek(SeekFrom::Start(offset))?;
            self.file.read_exact(&mut dst[..available])?;
            dst[available..].fill(0);
            Ok(())
        }

        fn write_blocks(&mut self, _start_lba: Lba, _src: &[u8]) -> Result<(), Self::Error> {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "image devices are read-only",
            ))
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }
}
