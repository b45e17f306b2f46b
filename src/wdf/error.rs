//! Error types for container decoding.

use thiserror::Error;

use super::block::BlockTag;

/// Errors that abort decoding of a single container.
///
/// Every variant is fatal to the file that produced it. Unknown block tags are
/// not errors and never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A read needed more bytes than the buffer holds
    #[error("Unexpected end of data at offset {offset}: needed {needed} bytes, {remaining} remain")]
    UnexpectedEndOfData {
        /// Offset of the failed read
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// The file does not start with the container magic
    #[error("Not a WDF container: found magic {found}")]
    BadMagic {
        /// The four bytes found where the magic was expected
        found: BlockTag,
    },

    /// Header version outside the supported range
    #[error("Unsupported format version {version} (supported {min}..={max})")]
    UnsupportedVersion {
        /// Version found in the header
        version: u32,
        /// Oldest supported version
        min: u32,
        /// Newest supported version
        max: u32,
    },

    /// A block header declares more payload than the buffer holds
    #[error("Corrupt file: block {tag} at offset {offset} declares {declared} bytes, {remaining} remain")]
    CorruptFile {
        /// Tag of the offending block
        tag: BlockTag,
        /// Offset of the block header
        offset: usize,
        /// Declared payload length
        declared: u64,
        /// Bytes remaining after the block header
        remaining: usize,
    },

    /// A block with a registered tag failed its decoder's structural checks
    #[error("Corrupt {tag} block at offset {offset}: {reason}")]
    CorruptBlock {
        /// Tag of the offending block
        tag: BlockTag,
        /// Offset of the block header
        offset: usize,
        /// What the decoder rejected
        reason: String,
    },
}

/// Structural failure reported by a block decoder.
///
/// The parser attaches the tag and offset and reports it as
/// [`ParseError::CorruptBlock`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BlockDecodeError(pub String);

impl BlockDecodeError {
    /// Build an error from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl From<ParseError> for BlockDecodeError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnexpectedEndOfData {
                offset,
                needed,
                remaining,
            } => Self(format!(
                "payload truncated at byte {}: needed {} bytes, {} remain",
                offset, needed, remaining
            )),
            other => Self(other.to_string()),
        }
    }
}

impl From<std::str::Utf8Error> for BlockDecodeError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self(format!("invalid UTF-8: {}", err))
    }
}
