//! Mapping from block tags to payload decoders.
//!
//! A registry is assembled once with [`BlockRegistryBuilder`] and is immutable
//! afterwards, so a single registry can be shared by any number of concurrent
//! parses. Tags without an entry are skipped by the parser.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use super::block::{BlockTag, RawBlock};
use super::decoders;
use super::error::BlockDecodeError;
use super::fragment::Fragment;

/// Signature of a payload decoder
pub type DecodeFn = fn(&RawBlock<'_>) -> Result<Fragment, BlockDecodeError>;

/// Decoding contract for one block kind
#[derive(Clone, Copy)]
pub struct DecoderEntry {
    /// Human readable block name
    pub name: &'static str,
    /// Smallest payload the decoder accepts
    pub min_len: usize,
    /// Payload decoder
    pub decode: DecodeFn,
}

impl DecoderEntry {
    /// Describe a block kind
    pub const fn new(name: &'static str, min_len: usize, decode: DecodeFn) -> Self {
        Self {
            name,
            min_len,
            decode,
        }
    }

    /// Check the minimal shape, then run the decoder.
    pub fn apply(&self, block: &RawBlock<'_>) -> Result<Fragment, BlockDecodeError> {
        if block.payload.len() < self.min_len {
            return Err(BlockDecodeError::new(format!(
                "{} payload is {} bytes, at least {} required",
                self.name,
                block.payload.len(),
                self.min_len
            )));
        }
        (self.decode)(block)
    }
}

impl fmt::Debug for DecoderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderEntry")
            .field("name", &self.name)
            .field("min_len", &self.min_len)
            .finish_non_exhaustive()
    }
}

/// Read-only tag → decoder table
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    entries: BTreeMap<BlockTag, DecoderEntry>,
}

impl BlockRegistry {
    /// Start building a registry
    pub fn builder() -> BlockRegistryBuilder {
        BlockRegistryBuilder::default()
    }

    /// The process-wide registry of standard block kinds, built on first use.
    pub fn standard() -> &'static BlockRegistry {
        static STANDARD: OnceLock<BlockRegistry> = OnceLock::new();
        STANDARD.get_or_init(|| BlockRegistry::builder().with_standard_blocks().build())
    }

    /// Decoder for `tag`, or `None` if blocks with this tag should be skipped
    pub fn lookup(&self, tag: BlockTag) -> Option<&DecoderEntry> {
        self.entries.get(&tag)
    }

    /// Registered tags in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (BlockTag, &DecoderEntry)> {
        self.entries.iter().map(|(tag, entry)| (*tag, entry))
    }

    /// Number of registered tags
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no tag is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`BlockRegistry`]
#[derive(Debug, Default)]
pub struct BlockRegistryBuilder {
    entries: BTreeMap<BlockTag, DecoderEntry>,
}

impl BlockRegistryBuilder {
    /// Register the standard axis, intensity, metadata, comment and image decoders.
    pub fn with_standard_blocks(self) -> Self {
        self.register(
            BlockTag::XLST,
            DecoderEntry::new("axis", decoders::AXIS_MIN_LEN, decoders::decode_axis),
        )
        .register(
            BlockTag::DATA,
            DecoderEntry::new(
                "intensity",
                decoders::INTENSITY_MIN_LEN,
                decoders::decode_intensity,
            ),
        )
        .register(
            BlockTag::PSET,
            DecoderEntry::new(
                "property set",
                decoders::PROPERTY_SET_MIN_LEN,
                decoders::decode_property_set,
            ),
        )
        .register(
            BlockTag::TEXT,
            DecoderEntry::new("comment", 0, decoders::decode_comment),
        )
        .register(
            BlockTag::WHTL,
            DecoderEntry::new("white light image", decoders::IMAGE_MIN_LEN, decoders::decode_image),
        )
    }

    /// Register (or replace) the decoder for `tag`
    pub fn register(mut self, tag: BlockTag, entry: DecoderEntry) -> Self {
        self.entries.insert(tag, entry);
        self
    }

    /// Remove the decoder for `tag` so such blocks are skipped
    pub fn unregister(mut self, tag: BlockTag) -> Self {
        self.entries.remove(&tag);
        self
    }

    /// Freeze the table
    pub fn build(self) -> BlockRegistry {
        BlockRegistry {
            entries: self.entries,
        }
    }
}
