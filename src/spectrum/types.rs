//! Spectrum data model.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::AssemblyError;

/// Physical unit of the spectral axis, using the instrument's unit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisUnit {
    /// Unitless index
    #[default]
    Arbitrary,
    /// Raman shift in cm⁻¹
    RamanShift,
    /// Absolute wavenumber in cm⁻¹
    Wavenumber,
    /// Wavelength in nanometres
    Nanometre,
    /// Photon energy in electron-volts
    ElectronVolt,
    /// Wavelength in microns
    Micron,
    /// Detector pixel index
    Pixel,
    /// Unit code this crate does not name
    Other(u32),
}

impl AxisUnit {
    /// Map an on-disk unit code to a unit. Unknown codes are preserved.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => AxisUnit::Arbitrary,
            1 => AxisUnit::RamanShift,
            2 => AxisUnit::Wavenumber,
            3 => AxisUnit::Nanometre,
            4 => AxisUnit::ElectronVolt,
            5 => AxisUnit::Micron,
            16 => AxisUnit::Pixel,
            other => AxisUnit::Other(other),
        }
    }

    /// On-disk unit code
    pub fn code(&self) -> u32 {
        match self {
            AxisUnit::Arbitrary => 0,
            AxisUnit::RamanShift => 1,
            AxisUnit::Wavenumber => 2,
            AxisUnit::Nanometre => 3,
            AxisUnit::ElectronVolt => 4,
            AxisUnit::Micron => 5,
            AxisUnit::Pixel => 16,
            AxisUnit::Other(code) => *code,
        }
    }

    /// Short unit symbol for column headers
    pub fn symbol(&self) -> &'static str {
        match self {
            AxisUnit::Arbitrary | AxisUnit::Other(_) => "a.u.",
            AxisUnit::RamanShift | AxisUnit::Wavenumber => "cm-1",
            AxisUnit::Nanometre => "nm",
            AxisUnit::ElectronVolt => "eV",
            AxisUnit::Micron => "um",
            AxisUnit::Pixel => "px",
        }
    }
}

/// A metadata value decoded from a property block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// UTF-8 text
    Text(String),
    /// Floating point scalar
    Float(f64),
    /// Signed integer scalar
    Integer(i64),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(text) => write!(f, "{}", text),
            MetadataValue::Float(value) => write!(f, "{}", value),
            MetadataValue::Integer(value) => write!(f, "{}", value),
            MetadataValue::Timestamp(time) => write!(f, "{}", time.to_rfc3339()),
        }
    }
}

/// Direction of a strictly monotonic axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisDirection {
    /// Every sample is larger than the previous one
    Ascending,
    /// Every sample is smaller than the previous one
    Descending,
}

/// A validated, immutable spectrum.
///
/// Construction guarantees that `x` and `y` have the same length of at least two
/// samples, that every value is finite, and that `x` is strictly monotonic in a
/// single direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    unit: AxisUnit,
    x: Vec<f64>,
    y: Vec<f64>,
    metadata: BTreeMap<String, MetadataValue>,
}

impl Spectrum {
    /// Validate the inputs and build a spectrum.
    pub fn new(
        unit: AxisUnit,
        x: Vec<f64>,
        y: Vec<f64>,
        metadata: BTreeMap<String, MetadataValue>,
    ) -> Result<Self, AssemblyError> {
        if x.len() != y.len() {
            return Err(AssemblyError::DimensionMismatch {
                axis: x.len(),
                intensity: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(AssemblyError::InvalidAxis(format!(
                "need at least 2 samples, got {}",
                x.len()
            )));
        }
        if let Some(index) = x.iter().position(|v| !v.is_finite()) {
            return Err(AssemblyError::InvalidAxis(format!(
                "non-finite value {} at index {}",
                x[index], index
            )));
        }
        if let Some(index) = y.iter().position(|v| !v.is_finite()) {
            return Err(AssemblyError::InvalidIntensity {
                index,
                value: y[index],
            });
        }
        axis_direction(&x)?;

        Ok(Self {
            unit,
            x,
            y,
            metadata,
        })
    }

    /// Axis unit
    pub fn unit(&self) -> AxisUnit {
        self.unit
    }

    /// Axis samples
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Intensity samples
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Metadata, ordered by key
    pub fn metadata(&self) -> &BTreeMap<String, MetadataValue> {
        &self.metadata
    }

    /// Number of samples (always at least 2)
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Direction of the axis
    pub fn direction(&self) -> AxisDirection {
        if self.x[1] > self.x[0] {
            AxisDirection::Ascending
        } else {
            AxisDirection::Descending
        }
    }

    /// Average absolute distance between neighbouring axis samples
    pub fn mean_spacing(&self) -> f64 {
        let span = (self.x[self.x.len() - 1] - self.x[0]).abs();
        span / (self.x.len() - 1) as f64
    }

    /// Iterate `(x, y)` pairs in stored order
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

fn axis_direction(x: &[f64]) -> Result<AxisDirection, AssemblyError> {
    let direction = if x[1] > x[0] {
        AxisDirection::Ascending
    } else if x[1] < x[0] {
        AxisDirection::Descending
    } else {
        return Err(AssemblyError::InvalidAxis(format!(
            "repeated value {} at index 1",
            x[1]
        )));
    };

    for (i, pair) in x.windows(2).enumerate() {
        let ok = match direction {
            AxisDirection::Ascending => pair[1] > pair[0],
            AxisDirection::Descending => pair[1] < pair[0],
        };
        if !ok {
            return Err(AssemblyError::InvalidAxis(format!(
                "not strictly monotonic at index {} ({} then {})",
                i + 1,
                pair[0],
                pair[1]
            )));
        }
    }
    Ok(direction)
}
