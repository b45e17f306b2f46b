//! Extraction parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::FingerprintError;

/// How the slowly varying signal floor is estimated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaselineMethod {
    /// Rolling minimum envelope, smoothed by a moving average of the same width.
    RollingMin,

    /// Iterative peak stripping: repeatedly replace each sample by the smaller of
    /// itself and its local moving average.
    #[default]
    AsymmetricSmoothing,
}

impl BaselineMethod {
    /// Returns all accepted method names.
    pub fn variants() -> &'static [&'static str] {
        &["rolling-min", "asymmetric-smoothing"]
    }
}

impl fmt::Display for BaselineMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaselineMethod::RollingMin => write!(f, "rolling-min"),
            BaselineMethod::AsymmetricSmoothing => write!(f, "asymmetric-smoothing"),
        }
    }
}

impl FromStr for BaselineMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rolling-min" | "rollingmin" | "min" => Ok(BaselineMethod::RollingMin),
            "asymmetric-smoothing" | "asymmetric" | "asymmetricsmoothing" => {
                Ok(BaselineMethod::AsymmetricSmoothing)
            }
            _ => Err(format!(
                "Unknown baseline method '{}'. Valid options: {}",
                s,
                BaselineMethod::variants().join(", ")
            )),
        }
    }
}

/// Configuration of the fingerprint pipeline.
///
/// Lengths are expressed in the physical units of the spectrum axis, so the
/// same configuration behaves alike on spectra acquired at different
/// resolutions. A copy travels with every [`Fingerprint`](super::Fingerprint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Baseline smoothing window width in axis units
    pub smoothing_window: f64,

    /// Minimum prominence as a multiple of the noise estimate
    pub prominence_factor: f64,

    /// Minimum distance between accepted band centers in axis units
    pub min_band_separation: f64,

    /// Baseline estimator
    pub baseline_method: BaselineMethod,

    /// Passes of the asymmetric smoother
    pub baseline_iterations: usize,

    /// Half-width of the fitting window in multiples of the estimated FWHM
    pub fit_window_factor: f64,

    /// Levenberg-Marquardt iteration cap per model
    pub fit_max_iterations: usize,

    /// Relative residual improvement below which a fit is converged
    pub fit_tolerance: f64,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 50.0,
            prominence_factor: 5.0,
            min_band_separation: 5.0,
            baseline_method: BaselineMethod::default(),
            baseline_iterations: 40,
            fit_window_factor: 3.0,
            fit_max_iterations: 100,
            fit_tolerance: 1e-10,
        }
    }
}

impl FingerprintConfig {
    /// Check every parameter, reporting the first one out of range.
    pub fn validate(&self) -> Result<(), FingerprintError> {
        fn invalid(message: String) -> Result<(), FingerprintError> {
            Err(FingerprintError::InvalidConfig(message))
        }

        if !(self.smoothing_window.is_finite() && self.smoothing_window > 0.0) {
            return invalid(format!(
                "smoothing_window must be positive, got {}",
                self.smoothing_window
            ));
        }
        if !(self.prominence_factor.is_finite() && self.prominence_factor >= 0.0) {
            return invalid(format!(
                "prominence_factor must be non-negative, got {}",
                self.prominence_factor
            ));
        }
        if !(self.min_band_separation.is_finite() && self.min_band_separation >= 0.0) {
            return invalid(format!(
                "min_band_separation must be non-negative, got {}",
                self.min_band_separation
            ));
        }
        if self.baseline_iterations == 0 {
            return invalid("baseline_iterations must be at least 1".to_string());
        }
        if !(self.fit_window_factor.is_finite() && self.fit_window_factor > 0.0) {
            return invalid(format!(
                "fit_window_factor must be positive, got {}",
                self.fit_window_factor
            ));
        }
        if self.fit_max_iterations == 0 {
            return invalid("fit_max_iterations must be at least 1".to_string());
        }
        if !(self.fit_tolerance.is_finite() && self.fit_tolerance > 0.0) {
            return invalid(format!(
                "fit_tolerance must be positive, got {}",
                self.fit_tolerance
            ));
        }
        Ok(())
    }

    /// Baseline half-window in samples for an axis with the given mean spacing.
    pub fn half_window_samples(&self, spacing: f64) -> usize {
        let samples = (self.smoothing_window / spacing / 2.0).round();
        if samples.is_finite() && samples >= 1.0 {
            samples as usize
        } else {
            1
        }
    }
}
