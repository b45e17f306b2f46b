//! Container file header.

use super::block::BlockTag;
use super::cursor::ByteCursor;
use super::error::ParseError;

/// Size of the file header on disk.
pub const FILE_HEADER_LEN: usize = 16;

/// Oldest container version this crate decodes.
pub const MIN_SUPPORTED_VERSION: u32 = 1;

/// Newest container version this crate decodes.
pub const MAX_SUPPORTED_VERSION: u32 = 1;

/// Fixed header at the start of every container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Format version
    pub version: u32,
    /// Number of blocks following the header; 0 means "read to end of buffer"
    pub block_count: u32,
    /// Global flags, carried but not interpreted
    pub flags: u32,
}

impl FileHeader {
    /// Header for the current format version with a fixed block count.
    pub fn new(block_count: u32) -> Self {
        Self {
            version: MAX_SUPPORTED_VERSION,
            block_count,
            flags: 0,
        }
    }

    /// True when the block sequence runs until the end of the buffer.
    pub fn is_streamed(&self) -> bool {
        self.block_count == 0
    }

    /// Decode and validate the header, failing fast on unknown magic or version.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, ParseError> {
        let magic = BlockTag(cursor.read_u32()?);
        if magic != BlockTag::WDF1 {
            return Err(ParseError::BadMagic { found: magic });
        }

        let version = cursor.read_u32()?;
        if !(MIN_SUPPORTED_VERSION..=MAX_SUPPORTED_VERSION).contains(&version) {
            return Err(ParseError::UnsupportedVersion {
                version,
                min: MIN_SUPPORTED_VERSION,
                max: MAX_SUPPORTED_VERSION,
            });
        }

        let block_count = cursor.read_u32()?;
        let flags = cursor.read_u32()?;

        Ok(Self {
            version,
            block_count,
            flags,
        })
    }
}
