//! Decoded, not yet assembled, pieces of a container.

use crate::spectrum::{AxisUnit, MetadataValue};

use super::block::{BlockTag, SampleEncoding};

/// Spectral axis decoded from an axis block
#[derive(Debug, Clone, PartialEq)]
pub struct AxisFragment {
    /// Physical unit of the samples
    pub unit: AxisUnit,
    /// Precision the samples were stored with
    pub encoding: SampleEncoding,
    /// Axis samples in file order
    pub values: Vec<f64>,
}

/// Intensities decoded from a data block
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityFragment {
    /// Precision the samples were stored with
    pub encoding: SampleEncoding,
    /// Intensity samples in file order
    pub values: Vec<f64>,
}

/// Key/value pairs in block order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataFragment {
    /// Entries; later duplicates of a key win during assembly
    pub entries: Vec<(String, MetadataValue)>,
}

/// Auxiliary raster carried alongside the spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFragment {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Opaque raster bytes
    pub data: Vec<u8>,
}

/// A block the registry has no decoder for, recorded but not interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownFragment {
    /// Block tag
    pub tag: BlockTag,
    /// Block instance id
    pub uid: u32,
    /// Offset of the block header
    pub offset: usize,
    /// Payload length that was skipped
    pub length: u64,
}

/// Any decoded block
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Spectral axis
    Axis(AxisFragment),
    /// Intensity samples
    Intensity(IntensityFragment),
    /// Metadata entries
    Metadata(MetadataFragment),
    /// Auxiliary image
    Image(ImageFragment),
    /// Skipped block
    Unknown(UnknownFragment),
}

/// Discriminant of [`Fragment`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// Spectral axis
    Axis,
    /// Intensity samples
    Intensity,
    /// Metadata entries
    Metadata,
    /// Auxiliary image
    Image,
    /// Skipped block
    Unknown,
}

impl Fragment {
    /// Which kind of fragment this is
    pub fn kind(&self) -> FragmentKind {
        match self {
            Fragment::Axis(_) => FragmentKind::Axis,
            Fragment::Intensity(_) => FragmentKind::Intensity,
            Fragment::Metadata(_) => FragmentKind::Metadata,
            Fragment::Image(_) => FragmentKind::Image,
            Fragment::Unknown(_) => FragmentKind::Unknown,
        }
    }
}

impl FragmentKind {
    /// Lower-case name for listings
    pub fn name(&self) -> &'static str {
        match self {
            FragmentKind::Axis => "axis",
            FragmentKind::Intensity => "intensity",
            FragmentKind::Metadata => "metadata",
            FragmentKind::Image => "image",
            FragmentKind::Unknown => "unknown",
        }
    }
}
