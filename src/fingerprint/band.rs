//! Band and fingerprint records.

use serde::Serialize;

use super::config::FingerprintConfig;
use super::error::FingerprintError;

/// Line shape that best describes a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandShape {
    /// Gaussian profile fitted best
    Gaussian,
    /// Lorentzian profile fitted best
    Lorentzian,
    /// Neither model converged; parameters are direct estimates
    Unresolved,
}

impl BandShape {
    /// Lower-case name for tabular output
    pub fn name(&self) -> &'static str {
        match self {
            BandShape::Gaussian => "gaussian",
            BandShape::Lorentzian => "lorentzian",
            BandShape::Unresolved => "unresolved",
        }
    }
}

/// One characteristic peak
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    center: f64,
    width: f64,
    height: f64,
    area: f64,
    shape: BandShape,
}

impl Band {
    /// Build a band; width must be positive, height and area non-negative, all finite.
    pub fn new(
        center: f64,
        width: f64,
        height: f64,
        area: f64,
        shape: BandShape,
    ) -> Result<Self, FingerprintError> {
        if !center.is_finite() {
            return Err(FingerprintError::InvalidBand(format!(
                "center {} is not finite",
                center
            )));
        }
        if !(width.is_finite() && width > 0.0) {
            return Err(FingerprintError::InvalidBand(format!(
                "width {} must be positive",
                width
            )));
        }
        if !(height.is_finite() && height >= 0.0) {
            return Err(FingerprintError::InvalidBand(format!(
                "height {} must be non-negative",
                height
            )));
        }
        if !(area.is_finite() && area >= 0.0) {
            return Err(FingerprintError::InvalidBand(format!(
                "area {} must be non-negative",
                area
            )));
        }
        Ok(Self {
            center,
            width,
            height,
            area,
            shape,
        })
    }

    /// Center position in axis units
    pub fn center(&self) -> f64 {
        self.center
    }

    /// Full width at half maximum in axis units
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height above the baseline
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Integrated area above the baseline
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Line shape classification
    pub fn shape(&self) -> BandShape {
        self.shape
    }
}

/// Bands of one spectrum, sorted ascending by center, plus the configuration
/// that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fingerprint {
    bands: Vec<Band>,
    config: FingerprintConfig,
}

impl Fingerprint {
    /// Package bands with their configuration, sorting by center.
    pub fn new(mut bands: Vec<Band>, config: FingerprintConfig) -> Self {
        bands.sort_by(|a, b| a.center.total_cmp(&b.center));
        Self { bands, config }
    }

    /// Bands in ascending center order
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Configuration used for extraction
    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Number of bands
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// True when no band was detected
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Iterate bands in ascending center order
    pub fn iter(&self) -> std::slice::Iter<'_, Band> {
        self.bands.iter()
    }
}

impl<'a> IntoIterator for &'a Fingerprint {
    type Item = &'a Band;
    type IntoIter = std::slice::Iter<'a, Band>;

    fn into_iter(self) -> Self::IntoIter {
        self.bands.iter()
    }
}
