//! Block-walking state machine.
//!
//! ```text
//! Start ──header ok──▶ ReadHeader ──▶ ReadBlockHeader ◀─────────────┐
//!   │                                   │          │                │
//!   └─bad magic/version─▶ Failed        │ known    │ unknown tag    │
//!                          ▲            ▼          ▼                │
//!          length overrun ─┤      DecodeBlock   SkipBlock ──────────┤
//!          decoder error  ─┘            └───────────────────────────┘
//!                                       no blocks remain ──▶ Done
//! ```
//!
//! `Done` and `Failed` are terminal. Fragments are only handed out from a parse
//! that reached `Done`.

use log::{debug, warn};

use super::block::{BlockTag, RawBlock};
use super::cursor::ByteCursor;
use super::error::ParseError;
use super::fragment::{Fragment, UnknownFragment};
use super::header::FileHeader;
use super::registry::{BlockRegistry, DecoderEntry};

/// Parser state. Block-carrying states hold the block about to be handled.
#[derive(Debug, Clone)]
pub enum ParserState<'a> {
    /// Nothing consumed yet
    Start,
    /// File header decoded and validated
    ReadHeader,
    /// About to read the next block header
    ReadBlockHeader,
    /// A registered block awaits decoding
    DecodeBlock {
        /// The block
        block: RawBlock<'a>,
        /// Its decoder
        entry: DecoderEntry,
    },
    /// An unregistered block awaits skipping
    SkipBlock {
        /// The block
        block: RawBlock<'a>,
    },
    /// All blocks consumed
    Done,
    /// Parsing aborted
    Failed(ParseError),
}

impl ParserState<'_> {
    /// True for `Done` and `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, ParserState::Done | ParserState::Failed(_))
    }

    /// State name for logs and listings
    pub fn name(&self) -> &'static str {
        match self {
            ParserState::Start => "Start",
            ParserState::ReadHeader => "ReadHeader",
            ParserState::ReadBlockHeader => "ReadBlockHeader",
            ParserState::DecodeBlock { .. } => "DecodeBlock",
            ParserState::SkipBlock { .. } => "SkipBlock",
            ParserState::Done => "Done",
            ParserState::Failed(_) => "Failed",
        }
    }
}

/// Where a block sat and how it was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRecord {
    /// Block tag
    pub tag: BlockTag,
    /// Block instance id
    pub uid: u32,
    /// Offset of the block header
    pub offset: usize,
    /// Declared payload length
    pub length: u64,
    /// Decoder name, `None` when the block was skipped
    pub decoder: Option<&'static str>,
}

/// Result of a parse that reached `Done`
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    /// Validated file header
    pub header: FileHeader,
    /// Decoded fragments in block order, including skipped blocks
    pub fragments: Vec<Fragment>,
    /// One record per block in file order
    pub blocks: Vec<BlockRecord>,
}

/// Sequential parser over one in-memory container.
///
/// A parser owns its cursor and is driven from a single thread; independent
/// files get independent parsers.
#[derive(Debug)]
pub struct FileParser<'a> {
    cursor: ByteCursor<'a>,
    registry: &'a BlockRegistry,
    state: ParserState<'a>,
    header: Option<FileHeader>,
    blocks_read: u32,
    fragments: Vec<Fragment>,
    blocks: Vec<BlockRecord>,
}

impl<'a> FileParser<'a> {
    /// Prepare a parser in the `Start` state
    pub fn new(buffer: &'a [u8], registry: &'a BlockRegistry) -> Self {
        Self {
            cursor: ByteCursor::new(buffer),
            registry,
            state: ParserState::Start,
            header: None,
            blocks_read: 0,
            fragments: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> &ParserState<'a> {
        &self.state
    }

    /// Header, once decoded
    pub fn header(&self) -> Option<&FileHeader> {
        self.header.as_ref()
    }

    /// Fragments decoded so far
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Perform one transition and return the new state.
    ///
    /// Stepping a terminal state leaves it unchanged.
    pub fn step(&mut self) -> &ParserState<'a> {
        let current = std::mem::replace(&mut self.state, ParserState::Done);
        self.state = self.transition(current);
        &self.state
    }

    /// Drive the machine to a terminal state.
    pub fn run(mut self) -> Result<ParsedFile, ParseError> {
        while !self.state.is_terminal() {
            self.step();
        }

        match (self.state, self.header) {
            (ParserState::Failed(err), _) => Err(err),
            (ParserState::Done, Some(header)) => Ok(ParsedFile {
                header,
                fragments: self.fragments,
                blocks: self.blocks,
            }),
            (state, _) => unreachable!("parser stopped in {}", state.name()),
        }
    }

    fn transition(&mut self, state: ParserState<'a>) -> ParserState<'a> {
        match state {
            ParserState::Start => match FileHeader::read(&mut self.cursor) {
                Ok(header) => {
                    debug!(
                        "WDF header: version {}, {} blocks, flags 0x{:08X}",
                        header.version,
                        if header.is_streamed() {
                            "streamed".to_string()
                        } else {
                            header.block_count.to_string()
                        },
                        header.flags
                    );
                    self.header = Some(header);
                    ParserState::ReadHeader
                }
                Err(err) => ParserState::Failed(err),
            },
            ParserState::ReadHeader => self.next_block_or_done(),
            ParserState::ReadBlockHeader => match self.read_block() {
                Ok(block) => match self.registry.lookup(block.tag) {
                    Some(entry) => ParserState::DecodeBlock {
                        block,
                        entry: *entry,
                    },
                    None => ParserState::SkipBlock { block },
                },
                Err(err) => ParserState::Failed(err),
            },
            ParserState::DecodeBlock { block, entry } => match entry.apply(&block) {
                Ok(fragment) => {
                    debug!(
                        "Decoded {} block ({}) at offset {}, {} bytes",
                        block.tag, entry.name, block.offset, block.length
                    );
                    self.fragments.push(fragment);
                    self.finish_block(&block, Some(entry.name))
                }
                Err(err) => ParserState::Failed(ParseError::CorruptBlock {
                    tag: block.tag,
                    offset: block.offset,
                    reason: err.0,
                }),
            },
            ParserState::SkipBlock { block } => {
                debug!(
                    "Skipping unregistered {} block at offset {}, {} bytes",
                    block.tag, block.offset, block.length
                );
                self.fragments.push(Fragment::Unknown(UnknownFragment {
                    tag: block.tag,
                    uid: block.uid,
                    offset: block.offset,
                    length: block.length,
                }));
                self.finish_block(&block, None)
            }
            terminal @ (ParserState::Done | ParserState::Failed(_)) => terminal,
        }
    }

    /// Read a block header and borrow its payload without consuming it.
    fn read_block(&mut self) -> Result<RawBlock<'a>, ParseError> {
        let offset = self.cursor.position();
        let tag = BlockTag(self.cursor.read_u32()?);
        let uid = self.cursor.read_u32()?;
        let length = self.cursor.read_u64()?;

        let remaining = self.cursor.remaining();
        let payload_len = match usize::try_from(length) {
            Ok(len) if len <= remaining => len,
            _ => {
                return Err(ParseError::CorruptFile {
                    tag,
                    offset,
                    declared: length,
                    remaining,
                })
            }
        };

        let payload = self.cursor.clone().read_bytes(payload_len)?;
        self.blocks_read += 1;

        Ok(RawBlock {
            tag,
            uid,
            length,
            payload,
            offset,
        })
    }

    /// Move past a handled block's payload and pick the next state.
    fn finish_block(&mut self, block: &RawBlock<'a>, decoder: Option<&'static str>) -> ParserState<'a> {
        if let Err(err) = self.cursor.skip(block.payload.len()) {
            return ParserState::Failed(err);
        }
        self.blocks.push(BlockRecord {
            tag: block.tag,
            uid: block.uid,
            offset: block.offset,
            length: block.length,
            decoder,
        });
        self.next_block_or_done()
    }

    fn next_block_or_done(&self) -> ParserState<'a> {
        let more = match self.header {
            Some(header) if !header.is_streamed() => self.blocks_read < header.block_count,
            _ => !self.cursor.is_empty(),
        };

        if more {
            return ParserState::ReadBlockHeader;
        }
        if !self.cursor.is_empty() {
            warn!(
                "Ignoring {} trailing bytes after {} blocks",
                self.cursor.remaining(),
                self.blocks_read
            );
        }
        ParserState::Done
    }
}
