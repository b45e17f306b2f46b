//! Container encoder.
//!
//! Produces buffers in the layout [`FileParser`](super::FileParser) reads. Used
//! by the `demo` command and to build fixtures.

use crate::spectrum::{AxisUnit, MetadataValue};

use super::block::{BlockTag, SampleEncoding};
use super::decoders::value_kind;
use super::filetime;
use super::header::MAX_SUPPORTED_VERSION;

/// Builder for an in-memory container
#[derive(Debug, Clone)]
pub struct FileBuilder {
    version: u32,
    flags: u32,
    streamed: bool,
    blocks: Vec<(BlockTag, Vec<u8>)>,
}

impl Default for FileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_str(buf: &mut Vec<u8>, text: &str) {
    push_u32(buf, text.len() as u32);
    buf.extend_from_slice(text.as_bytes());
}

fn push_samples(buf: &mut Vec<u8>, encoding: SampleEncoding, values: &[f64]) {
    push_u64(buf, values.len() as u64);
    for value in values {
        match encoding {
            SampleEncoding::Float32 => buf.extend_from_slice(&(*value as f32).to_le_bytes()),
            SampleEncoding::Float64 => buf.extend_from_slice(&value.to_le_bytes()),
        }
    }
}

impl FileBuilder {
    /// Empty container at the newest supported version, counted block mode
    pub fn new() -> Self {
        Self {
            version: MAX_SUPPORTED_VERSION,
            flags: 0,
            streamed: false,
            blocks: Vec::new(),
        }
    }

    /// Override the header version
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set the global flags
    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Write a block count of 0 so readers consume blocks to the end of the buffer
    pub fn streamed(mut self, streamed: bool) -> Self {
        self.streamed = streamed;
        self
    }

    /// Append an axis block
    pub fn axis(self, unit: AxisUnit, encoding: SampleEncoding, values: &[f64]) -> Self {
        let mut payload = Vec::with_capacity(16 + values.len() * encoding.byte_size());
        push_u32(&mut payload, unit.code());
        push_u32(&mut payload, encoding.code());
        push_samples(&mut payload, encoding, values);
        self.raw_block(BlockTag::XLST, payload)
    }

    /// Append an intensity block
    pub fn intensity(self, encoding: SampleEncoding, values: &[f64]) -> Self {
        let mut payload = Vec::with_capacity(12 + values.len() * encoding.byte_size());
        push_u32(&mut payload, encoding.code());
        push_samples(&mut payload, encoding, values);
        self.raw_block(BlockTag::DATA, payload)
    }

    /// Append a property set block.
    ///
    /// Timestamps before 1601-01-01 cannot be represented and are written as
    /// the FILETIME origin.
    pub fn properties(self, entries: &[(&str, MetadataValue)]) -> Self {
        let mut payload = Vec::new();
        push_u32(&mut payload, entries.len() as u32);
        for (key, value) in entries {
            push_str(&mut payload, key);
            match value {
                MetadataValue::Text(text) => {
                    push_u32(&mut payload, value_kind::TEXT);
                    push_str(&mut payload, text);
                }
                MetadataValue::Float(number) => {
                    push_u32(&mut payload, value_kind::FLOAT);
                    payload.extend_from_slice(&number.to_le_bytes());
                }
                MetadataValue::Integer(number) => {
                    push_u32(&mut payload, value_kind::INTEGER);
                    payload.extend_from_slice(&number.to_le_bytes());
                }
                MetadataValue::Timestamp(time) => {
                    push_u32(&mut payload, value_kind::FILETIME);
                    push_u64(&mut payload, filetime::from_datetime(time).unwrap_or(0));
                }
            }
        }
        self.raw_block(BlockTag::PSET, payload)
    }

    /// Append a comment block
    pub fn comment(self, text: &str) -> Self {
        self.raw_block(BlockTag::TEXT, text.as_bytes().to_vec())
    }

    /// Append a white light image block
    pub fn image(self, width: u32, height: u32, data: &[u8]) -> Self {
        let mut payload = Vec::with_capacity(8 + data.len());
        push_u32(&mut payload, width);
        push_u32(&mut payload, height);
        payload.extend_from_slice(data);
        self.raw_block(BlockTag::WHTL, payload)
    }

    /// Append a block with an arbitrary tag and payload
    pub fn raw_block(mut self, tag: BlockTag, payload: Vec<u8>) -> Self {
        self.blocks.push((tag, payload));
        self
    }

    /// Number of blocks appended so far
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Encode header and blocks. Block uids are assigned in order from 0.
    pub fn build(&self) -> Vec<u8> {
        let body: usize = self.blocks.iter().map(|(_, p)| 16 + p.len()).sum();
        let mut buf = Vec::with_capacity(16 + body);

        push_u32(&mut buf, BlockTag::WDF1.0);
        push_u32(&mut buf, self.version);
        push_u32(
            &mut buf,
            if self.streamed {
                0
            } else {
                self.blocks.len() as u32
            },
        );
        push_u32(&mut buf, self.flags);

        for (uid, (tag, payload)) in self.blocks.iter().enumerate() {
            push_u32(&mut buf, tag.0);
            push_u32(&mut buf, uid as u32);
            push_u64(&mut buf, payload.len() as u64);
            buf.extend_from_slice(payload);
        }
        buf
    }
}
