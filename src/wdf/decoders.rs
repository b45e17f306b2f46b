//! Payload decoders for the standard block kinds.
//!
//! Each decoder receives exactly the declared payload of one block and either
//! produces a fragment or explains which structural check failed.

use crate::spectrum::{AxisUnit, MetadataValue};

use super::block::{RawBlock, SampleEncoding};
use super::cursor::ByteCursor;
use super::error::BlockDecodeError;
use super::filetime;
use super::fragment::{
    AxisFragment, Fragment, ImageFragment, IntensityFragment, MetadataFragment,
};

/// Minimal axis payload: unit, encoding, count
pub const AXIS_MIN_LEN: usize = 16;
/// Minimal intensity payload: encoding, count
pub const INTENSITY_MIN_LEN: usize = 12;
/// Minimal property set payload: entry count
pub const PROPERTY_SET_MIN_LEN: usize = 4;
/// Minimal image payload: width, height
pub const IMAGE_MIN_LEN: usize = 8;

/// Metadata value kind codes inside a property set
pub mod value_kind {
    /// Length-prefixed UTF-8 text
    pub const TEXT: u32 = 0;
    /// f64
    pub const FLOAT: u32 = 1;
    /// i64
    pub const INTEGER: u32 = 2;
    /// Windows FILETIME (u64)
    pub const FILETIME: u32 = 3;
}

/// Metadata key under which comment blocks are stored
pub const COMMENT_KEY: &str = "comment";

fn read_encoding(cursor: &mut ByteCursor<'_>) -> Result<SampleEncoding, BlockDecodeError> {
    let code = cursor.read_u32()?;
    SampleEncoding::from_code(code)
        .ok_or_else(|| BlockDecodeError::new(format!("unknown sample encoding {}", code)))
}

/// Read `count` samples that must fill the rest of the payload exactly.
fn read_samples(
    cursor: &mut ByteCursor<'_>,
    encoding: SampleEncoding,
) -> Result<Vec<f64>, BlockDecodeError> {
    let count = cursor.read_u64()?;
    let expected = usize::try_from(count)
        .ok()
        .and_then(|c| c.checked_mul(encoding.byte_size()))
        .ok_or_else(|| BlockDecodeError::new(format!("sample count {} overflows", count)))?;

    if expected != cursor.remaining() {
        return Err(BlockDecodeError::new(format!(
            "{} samples need {} bytes, payload has {}",
            count,
            expected,
            cursor.remaining()
        )));
    }

    let count = expected / encoding.byte_size();
    let mut values = Vec::with_capacity(count);
    match encoding {
        SampleEncoding::Float32 => {
            for _ in 0..count {
                values.push(cursor.read_f32()?);
            }
        }
        SampleEncoding::Float64 => {
            for _ in 0..count {
                values.push(cursor.read_f64()?);
            }
        }
    }
    Ok(values)
}

fn read_string(cursor: &mut ByteCursor<'_>, what: &str) -> Result<String, BlockDecodeError> {
    let len = cursor.read_u32()? as usize;
    let bytes = cursor
        .read_bytes(len)
        .map_err(|_| BlockDecodeError::new(format!("{} of {} bytes overruns payload", what, len)))?;
    Ok(std::str::from_utf8(bytes)?.to_string())
}

/// Decode an `XLST` block: unit, encoding, sample count, samples.
pub fn decode_axis(block: &RawBlock<'_>) -> Result<Fragment, BlockDecodeError> {
    let mut cursor = ByteCursor::new(block.payload);
    let unit = AxisUnit::from_code(cursor.read_u32()?);
    let encoding = read_encoding(&mut cursor)?;
    let values = read_samples(&mut cursor, encoding)?;

    Ok(Fragment::Axis(AxisFragment {
        unit,
        encoding,
        values,
    }))
}

/// Decode a `DATA` block: encoding, sample count, samples.
pub fn decode_intensity(block: &RawBlock<'_>) -> Result<Fragment, BlockDecodeError> {
    let mut cursor = ByteCursor::new(block.payload);
    let encoding = read_encoding(&mut cursor)?;
    let values = read_samples(&mut cursor, encoding)?;

    Ok(Fragment::Intensity(IntensityFragment { encoding, values }))
}

/// Decode a `PSET` block of typed key/value entries.
pub fn decode_property_set(block: &RawBlock<'_>) -> Result<Fragment, BlockDecodeError> {
    let mut cursor = ByteCursor::new(block.payload);
    let count = cursor.read_u32()?;
    let mut entries = Vec::new();

    for index in 0..count {
        let key = read_string(&mut cursor, "key")?;
        let kind = cursor.read_u32()?;
        let value = match kind {
            value_kind::TEXT => MetadataValue::Text(read_string(&mut cursor, "text value")?),
            value_kind::FLOAT => MetadataValue::Float(cursor.read_f64()?),
            value_kind::INTEGER => MetadataValue::Integer(cursor.read_i64()?),
            value_kind::FILETIME => {
                let raw = cursor.read_u64()?;
                let time = filetime::to_datetime(raw).ok_or_else(|| {
                    BlockDecodeError::new(format!("FILETIME {} out of range for '{}'", raw, key))
                })?;
                MetadataValue::Timestamp(time)
            }
            other => {
                return Err(BlockDecodeError::new(format!(
                    "entry {} ('{}') has unknown value kind {}",
                    index, key, other
                )))
            }
        };
        entries.push((key, value));
    }

    if !cursor.is_empty() {
        return Err(BlockDecodeError::new(format!(
            "{} trailing bytes after {} entries",
            cursor.remaining(),
            count
        )));
    }

    Ok(Fragment::Metadata(MetadataFragment { entries }))
}

/// Decode a `TEXT` block into a single comment entry.
pub fn decode_comment(block: &RawBlock<'_>) -> Result<Fragment, BlockDecodeError> {
    let text = std::str::from_utf8(block.payload)?.trim_end_matches('\0');

    Ok(Fragment::Metadata(MetadataFragment {
        entries: vec![(COMMENT_KEY.to_string(), MetadataValue::Text(text.to_string()))],
    }))
}

/// Decode a `WHTL` block: width, height, opaque raster bytes.
pub fn decode_image(block: &RawBlock<'_>) -> Result<Fragment, BlockDecodeError> {
    let mut cursor = ByteCursor::new(block.payload);
    let width = cursor.read_u32()?;
    let height = cursor.read_u32()?;
    let data = cursor.read_bytes(cursor.remaining())?.to_vec();

    Ok(Fragment::Image(ImageFragment {
        width,
        height,
        data,
    }))
}
