//! Crate-level error for the decode pipeline.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::spectrum::AssemblyError;
use crate::wdf::ParseError;

/// Failure to turn a buffer into a [`Spectrum`](crate::spectrum::Spectrum).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The container could not be walked
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The blocks were readable but do not form a valid spectrum
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// Flat discriminant of every decode failure, for tallies and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Buffer ended inside a read
    UnexpectedEndOfData,
    /// Missing file signature
    BadMagic,
    /// Header version outside the supported range
    UnsupportedVersion,
    /// Declared block length overruns the buffer
    CorruptFile,
    /// A known block failed its structural checks
    CorruptBlock,
    /// Axis or intensity absent
    MissingRequiredBlock,
    /// Axis or intensity present twice
    DuplicateBlock,
    /// Axis and intensity lengths disagree
    DimensionMismatch,
    /// Degenerate or non-monotonic axis
    InvalidAxis,
    /// Non-finite intensity sample
    InvalidIntensity,
}

impl ErrorKind {
    /// Stable snake_case name
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::UnexpectedEndOfData => "unexpected_end_of_data",
            ErrorKind::BadMagic => "bad_magic",
            ErrorKind::UnsupportedVersion => "unsupported_version",
            ErrorKind::CorruptFile => "corrupt_file",
            ErrorKind::CorruptBlock => "corrupt_block",
            ErrorKind::MissingRequiredBlock => "missing_required_block",
            ErrorKind::DuplicateBlock => "duplicate_block",
            ErrorKind::DimensionMismatch => "dimension_mismatch",
            ErrorKind::InvalidAxis => "invalid_axis",
            ErrorKind::InvalidIntensity => "invalid_intensity",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Error {
    /// Discriminant of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse(e) => match e {
                ParseError::UnexpectedEndOfData { .. } => ErrorKind::UnexpectedEndOfData,
                ParseError::BadMagic { .. } => ErrorKind::BadMagic,
                ParseError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
                ParseError::CorruptFile { .. } => ErrorKind::CorruptFile,
                ParseError::CorruptBlock { .. } => ErrorKind::CorruptBlock,
            },
            Error::Assembly(e) => match e {
                AssemblyError::MissingRequiredBlock { .. } => ErrorKind::MissingRequiredBlock,
                AssemblyError::DuplicateBlock { .. } => ErrorKind::DuplicateBlock,
                AssemblyError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
                AssemblyError::InvalidAxis(_) => ErrorKind::InvalidAxis,
                AssemblyError::InvalidIntensity { .. } => ErrorKind::InvalidIntensity,
            },
        }
    }
}
