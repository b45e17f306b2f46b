//! # specfp - Spectral Fingerprints from WDF Containers
//!
//! `specfp` decodes the block-structured binary container written by Raman
//! spectrometers into a validated [`Spectrum`](spectrum::Spectrum), and reduces
//! a spectrum to a compact [`Fingerprint`](fingerprint::Fingerprint): the list
//! of its characteristic bands with center, width, height, area and line shape.
//!
//! ## Key Features
//!
//! - **Forward Compatible Parsing**: Blocks with unrecognised tags are skipped
//!   by their declared length, so files from newer instruments still decode.
//!
//! - **Inspectable State Machine**: [`wdf::FileParser`] walks a closed set of
//!   states one transition at a time.
//!
//! - **Pluggable Decoders**: Block decoders live in a [`wdf::BlockRegistry`]
//!   mapping tags to functions; the standard registry is built once and shared.
//!
//! - **Resolution Independent Fingerprints**: Every length in the
//!   [`FingerprintConfig`](fingerprint::FingerprintConfig) is in axis units.
//!
//! - **Deterministic**: The same bytes and configuration always give the same
//!   fingerprint, bit for bit.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use specfp::fingerprint::FingerprintConfig;
//!
//! let bytes = std::fs::read("sample.wdf")?;
//! let spectrum = specfp::parse(&bytes)?;
//! let fingerprint = specfp::extract_fingerprint(&spectrum, &FingerprintConfig::default())?;
//!
//! for band in fingerprint.iter() {
//!     println!("{:>10.2} {:>8.2} {:?}", band.center(), band.width(), band.shape());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`wdf`]: byte cursor, block registry, parser state machine and a writer
//! - [`spectrum`]: the validated spectrum model and fragment assembly
//! - [`fingerprint`]: baseline, noise, peak detection and line-shape fitting
//! - [`batch`]: parallel processing of many files with per-file outcomes
//! - [`export`]: CSV and JSON serialization of spectra, fingerprints and reports

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod batch;
pub mod error;
pub mod export;
pub mod fingerprint;
pub mod spectrum;
pub mod wdf;

pub use error::{Error, ErrorKind};

use fingerprint::{Fingerprint, FingerprintConfig, FingerprintError, FingerprintExtractor};
use spectrum::{Spectrum, SpectrumAssembler};
use wdf::BlockRegistry;

/// Decode `buffer` into a spectrum using the standard block registry.
pub fn parse(buffer: &[u8]) -> Result<Spectrum, Error> {
    parse_with(buffer, BlockRegistry::standard())
}

/// Decode `buffer` into a spectrum using a custom block registry.
pub fn parse_with(buffer: &[u8], registry: &BlockRegistry) -> Result<Spectrum, Error> {
    let parsed = wdf::parse_blocks(buffer, registry)?;
    Ok(SpectrumAssembler::assemble(parsed.fragments)?)
}

/// Extract the band fingerprint of `spectrum`.
///
/// Fails only when `config` is out of range; a spectrum without bands gives an
/// empty fingerprint.
pub fn extract_fingerprint(
    spectrum: &Spectrum,
    config: &FingerprintConfig,
) -> Result<Fingerprint, FingerprintError> {
    let extractor = FingerprintExtractor::new(config.clone())?;
    Ok(extractor.extract(spectrum))
}

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::batch::{BatchDriver, BatchOptions, BatchReport, CancelToken, FileOutcome};
    pub use crate::error::{Error, ErrorKind};
    pub use crate::fingerprint::{
        Band, BandShape, BaselineMethod, Fingerprint, FingerprintConfig, FingerprintError,
        FingerprintExtractor,
    };
    pub use crate::spectrum::{AxisDirection, AxisUnit, MetadataValue, Spectrum};
    pub use crate::wdf::{BlockRegistry, BlockTag, FileBuilder, FileParser, ParseError};
    pub use crate::{extract_fingerprint, parse, parse_with};
}
