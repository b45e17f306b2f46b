//! # WDF Container Module
//!
//! Decoding of the block-structured binary container written by Raman
//! instruments.
//!
//! ## Layout
//!
//! ```text
//! FileHeader (16 bytes)
//! ├── magic        u32   "WDF1"
//! ├── version      u32
//! ├── block_count  u32   0 = blocks run to the end of the buffer
//! └── flags        u32
//! Block* (repeated)
//! ├── tag          u32   four ASCII bytes, e.g. "DATA"
//! ├── uid          u32
//! ├── length       u64   payload bytes
//! └── payload      [u8; length]
//! ```
//!
//! Every block can be skipped by its length alone. Blocks whose tag has no
//! entry in the [`BlockRegistry`] are recorded as [`Fragment::Unknown`] and
//! skipped, so files written by newer instruments still decode. A declared
//! length that overruns the buffer, or a known block whose payload is
//! malformed, aborts the whole file.
//!
//! ## Standard blocks
//!
//! | Tag    | Fragment  | Payload                                         |
//! |--------|-----------|-------------------------------------------------|
//! | `XLST` | Axis      | unit, encoding, count, samples                  |
//! | `DATA` | Intensity | encoding, count, samples                        |
//! | `PSET` | Metadata  | typed key/value entries                         |
//! | `TEXT` | Metadata  | UTF-8 comment                                   |
//! | `WHTL` | Image     | width, height, raster bytes                     |

mod block;
mod cursor;
mod decoders;
mod error;
mod fragment;
mod header;
mod parser;
mod registry;
mod writer;

pub mod filetime;

#[cfg(test)]
mod tests;

pub use block::{BlockTag, RawBlock, SampleEncoding, BLOCK_HEADER_LEN};
pub use cursor::ByteCursor;
pub use decoders::{
    decode_axis, decode_comment, decode_image, decode_intensity, decode_property_set, value_kind,
    COMMENT_KEY,
};
pub use error::{BlockDecodeError, ParseError};
pub use fragment::{
    AxisFragment, Fragment, FragmentKind, ImageFragment, IntensityFragment, MetadataFragment,
    UnknownFragment,
};
pub use header::{FileHeader, FILE_HEADER_LEN, MAX_SUPPORTED_VERSION, MIN_SUPPORTED_VERSION};
pub use parser::{BlockRecord, FileParser, ParsedFile, ParserState};
pub use registry::{BlockRegistry, BlockRegistryBuilder, DecodeFn, DecoderEntry};
pub use writer::FileBuilder;

/// Walk every block of `buffer` with `registry` and return the fragments.
pub fn parse_blocks(buffer: &[u8], registry: &BlockRegistry) -> Result<ParsedFile, ParseError> {
    FileParser::new(buffer, registry).run()
}
