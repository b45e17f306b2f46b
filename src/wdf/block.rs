//! Block tags, raw blocks and sample encodings.

use std::fmt;

/// Size of a block header on disk: tag (u32), uid (u32), payload length (u64).
pub const BLOCK_HEADER_LEN: usize = 16;

/// Four-character block identifier stored as a little-endian `u32`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockTag(pub u32);

impl BlockTag {
    /// File header magic
    pub const WDF1: BlockTag = BlockTag::from_ascii(b"WDF1");
    /// Intensity samples
    pub const DATA: BlockTag = BlockTag::from_ascii(b"DATA");
    /// X axis (unit + samples)
    pub const XLST: BlockTag = BlockTag::from_ascii(b"XLST");
    /// Y axis of mapped acquisitions (not interpreted)
    pub const YLST: BlockTag = BlockTag::from_ascii(b"YLST");
    /// Key/value property set
    pub const PSET: BlockTag = BlockTag::from_ascii(b"PSET");
    /// Free text comment
    pub const TEXT: BlockTag = BlockTag::from_ascii(b"TEXT");
    /// White light image
    pub const WHTL: BlockTag = BlockTag::from_ascii(b"WHTL");

    /// Build a tag from its four ASCII bytes.
    pub const fn from_ascii(bytes: &[u8; 4]) -> Self {
        BlockTag(u32::from_le_bytes(*bytes))
    }

    /// The four raw bytes of the tag.
    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        let printable = bytes.iter().all(|b| b.is_ascii_graphic() || *b == 0);
        if printable {
            let text: String = bytes
                .iter()
                .filter(|b| **b != 0)
                .map(|b| *b as char)
                .collect();
            write!(f, "{}", text)
        } else {
            write!(f, "0x{:08X}", self.0)
        }
    }
}

impl fmt::Debug for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockTag({})", self)
    }
}

/// One tagged, length-prefixed block as it sits in the source buffer.
///
/// Raw blocks borrow their payload from the buffer being parsed and live only
/// as long as the parse that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlock<'a> {
    /// Block identifier
    pub tag: BlockTag,
    /// Block instance id
    pub uid: u32,
    /// Declared payload length in bytes
    pub length: u64,
    /// Payload, exactly `length` bytes
    pub payload: &'a [u8],
    /// Offset of the block header in the source buffer
    pub offset: usize,
}

/// On-disk precision of a sample sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleEncoding {
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    #[default]
    Float64,
}

impl SampleEncoding {
    /// Determine encoding from its on-disk code
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(SampleEncoding::Float32),
            2 => Some(SampleEncoding::Float64),
            _ => None,
        }
    }

    /// On-disk code of this encoding
    pub fn code(&self) -> u32 {
        match self {
            SampleEncoding::Float32 => 1,
            SampleEncoding::Float64 => 2,
        }
    }

    /// Get the byte size per value
    pub fn byte_size(&self) -> usize {
        match self {
            SampleEncoding::Float32 => 4,
            SampleEncoding::Float64 => 8,
        }
    }
}
