//! TOML configuration file support.
//!
//! Instead of repeating flags, settings can live in a config file:
//!
//! ```toml
//! # specfp.toml
//! [fingerprint]
//! smoothing_window = 80.0
//! prominence_factor = 6.0
//! min_band_separation = 4.0
//! baseline_method = "rolling-min"
//!
//! [batch]
//! jobs = 8
//! ```
//!
//! Command-line flags override file values, which override the defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use specfp::fingerprint::{BaselineMethod, FingerprintConfig};

use super::FingerprintArgs;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "specfp.toml";

/// Root configuration structure for specfp.toml files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Fingerprint parameter overrides.
    #[serde(default)]
    pub fingerprint: FingerprintSection,

    /// Batch settings.
    #[serde(default)]
    pub batch: BatchSection,
}

/// `[fingerprint]` table; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FingerprintSection {
    /// Baseline smoothing window in axis units.
    pub smoothing_window: Option<f64>,

    /// Minimum prominence in multiples of the noise estimate.
    pub prominence_factor: Option<f64>,

    /// Minimum distance between band centers.
    pub min_band_separation: Option<f64>,

    /// Baseline estimator.
    pub baseline_method: Option<BaselineMethod>,

    /// Passes of the asymmetric smoother.
    pub baseline_iterations: Option<usize>,

    /// Fit window half-width in FWHM units.
    pub fit_window_factor: Option<f64>,

    /// Iteration cap per line-shape fit.
    pub fit_max_iterations: Option<usize>,

    /// Relative convergence tolerance of the fits.
    pub fit_tolerance: Option<f64>,
}

/// `[batch]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchSection {
    /// Worker threads.
    pub jobs: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load `path`, or the default file if it exists, or nothing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    log::info!("Using {}", default.display());
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Combine defaults, file values and command-line flags, in rising priority.
    pub fn resolve(&self, args: &FingerprintArgs) -> (FingerprintConfig, Option<usize>) {
        let defaults = FingerprintConfig::default();
        let file = &self.fingerprint;

        let config = FingerprintConfig {
            smoothing_window: args
                .smoothing_window
                .or(file.smoothing_window)
                .unwrap_or(defaults.smoothing_window),
            prominence_factor: args
                .prominence_factor
                .or(file.prominence_factor)
                .unwrap_or(defaults.prominence_factor),
            min_band_separation: args
                .min_separation
                .or(file.min_band_separation)
                .unwrap_or(defaults.min_band_separation),
            baseline_method: args
                .baseline
                .map(BaselineMethod::from)
                .or(file.baseline_method)
                .unwrap_or(defaults.baseline_method),
            baseline_iterations: file
                .baseline_iterations
                .unwrap_or(defaults.baseline_iterations),
            fit_window_factor: file
                .fit_window_factor
                .unwrap_or(defaults.fit_window_factor),
            fit_max_iterations: file
                .fit_max_iterations
                .unwrap_or(defaults.fit_max_iterations),
            fit_tolerance: file.fit_tolerance.unwrap_or(defaults.fit_tolerance),
        };

        (config, args.jobs.or(self.batch.jobs))
    }
}
