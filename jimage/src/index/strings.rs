//! String table access and name hashing

use crate::error::{JImageError, Result};

/// Multiplier (and default seed) of the image name hash
pub const HASH_MULTIPLIER: i32 = 0x0100_0193;

/// Mask keeping hash values non-negative
const POSITIVE_MASK: i32 = 0x7FFF_FFFF;

/// Hash `name` with `seed`, as the image writer does for its redirect table
pub fn hash_code(name: &str, seed: i32) -> i32 {
    name.bytes()
        .fold(seed, |acc, byte| acc.wrapping_mul(HASH_MULTIPLIER) ^ byte as i32)
        & POSITIVE_MASK
}

/// NUL terminated strings addressed by byte offset
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    bytes: &'a [u8],
}

impl<'a> StringTable<'a> {
    /// Wrap raw string table bytes
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// String starting at `offset`
    ///
    /// Offset 0 is always the empty string, even for an empty table.
    pub fn get(&self, offset: u64) -> Result<&'a str> {
        if offset == 0 && self.bytes.is_empty() {
            return Ok("");
        }

        let start = usize::try_from(offset).map_err(|_| JImageError::InvalidString(offset))?;
        let tail = self
            .bytes
            .get(start..)
            .ok_or(JImageError::InvalidString(offset))?;
        let len = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(JImageError::InvalidString(offset))?;
        core::str::from_utf8(&tail[..len]).map_err(|_| JImageError::InvalidString(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_hashes_to_seed() {
        assert_eq!(hash_code("", HASH_MULTIPLIER), 0x0100_0193);
    }

    #[test]
    fn known_hashes() {
        assert_eq!(hash_code("a", HASH_MULTIPLIER), 0x2602_7a08);
        assert_eq!(
            hash_code("/java.base/java/lang/String.class", HASH_MULTIPLIER),
            0x6f03_a325
        );
    }

    #[test]
    fn string_lookup() {
        let table = StringTable::new(b"\0java.base\0class\0");
        assert_eq!(table.get(0), Ok(""));
        assert_eq!(table.get(1), Ok("java.base"));
        assert_eq!(table.get(11), Ok("class"));
        assert_eq!(table.get(5), Ok("base"));
        assert_eq!(table.get(64), Err(JImageError::InvalidString(64)));
    }

    #[test]
    fn unterminated_string_rejected() {
        let table = StringTable::new(b"\0open");
        assert_eq!(table.get(1), Err(JImageError::InvalidString(1)));
    }
}
