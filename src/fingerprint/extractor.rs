use std::borrow::Cow;

use log::debug;

use super::band::{Band, Fingerprint};
use super::baseline;
use super::config::FingerprintConfig;
use super::error::FingerprintError;
use super::fit;
use super::noise;
use super::peaks::{self, PeakCandidate};
use crate::spectrum::{AxisDirection, Spectrum};

/// Intermediate results of one extraction, in ascending axis order.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Axis values, ascending
    pub x: Vec<f64>,
    /// Estimated baseline
    pub baseline: Vec<f64>,
    /// Intensity minus baseline
    pub corrected: Vec<f64>,
    /// Robust noise scale of `corrected`
    pub noise: f64,
    /// Prominence a peak must exceed: the noise-scaled threshold, never below
    /// the rounding floor of the intensities
    pub threshold: f64,
    /// Peaks that passed the threshold and the separation rule, in axis order
    pub peaks: Vec<PeakCandidate>,
}

/// Runs the fingerprint pipeline with a validated configuration.
///
/// The pipeline is pure: the same spectrum and configuration always produce
/// the same fingerprint, so one extractor can be shared across threads.
#[derive(Debug, Clone)]
pub struct FingerprintExtractor {
    config: FingerprintConfig,
}

impl FingerprintExtractor {
    /// Validate `config` and build an extractor.
    pub fn new(config: FingerprintConfig) -> Result<Self, FingerprintError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Run baseline correction, noise estimation and peak selection.
    pub fn analyze(&self, spectrum: &Spectrum) -> Analysis {
        let (x, y): (Cow<'_, [f64]>, Cow<'_, [f64]>) = match spectrum.direction() {
            AxisDirection::Ascending => (Cow::Borrowed(spectrum.x()), Cow::Borrowed(spectrum.y())),
            AxisDirection::Descending => (
                Cow::Owned(spectrum.x().iter().rev().copied().collect()),
                Cow::Owned(spectrum.y().iter().rev().copied().collect()),
            ),
        };

        let half_window = self.config.half_window_samples(spectrum.mean_spacing());
        let baseline = baseline::estimate(
            &y,
            half_window,
            self.config.baseline_method,
            self.config.baseline_iterations,
        );
        let corrected = baseline::correct(&y, &baseline);
        let noise = noise::estimate(&corrected);
        let threshold =
            (self.config.prominence_factor * noise).max(noise::resolution_floor(&y));

        let candidates = peaks::find_candidates(&corrected, threshold);
        let candidate_count = candidates.len();
        let peaks = peaks::select_separated(candidates, &x, self.config.min_band_separation);

        debug!(
            "Baseline half-window {} samples, noise {:.4e}, threshold {:.4e}: {} candidates, {} kept",
            half_window,
            noise,
            threshold,
            candidate_count,
            peaks.len()
        );

        Analysis {
            x: x.into_owned(),
            baseline,
            corrected,
            noise,
            threshold,
            peaks,
        }
    }

    /// Extract the fingerprint of `spectrum`.
    pub fn extract(&self, spectrum: &Spectrum) -> Fingerprint {
        let analysis = self.analyze(spectrum);

        let bands: Vec<Band> = analysis
            .peaks
            .iter()
            .filter_map(|peak| {
                match fit::resolve_band(&analysis.x, &analysis.corrected, peak, &self.config) {
                    Ok(band) => Some(band),
                    Err(e) => {
                        debug!("Dropping peak at index {}: {}", peak.index, e);
                        None
                    }
                }
            })
            .collect();

        Fingerprint::new(bands, self.config.clone())
    }
}
