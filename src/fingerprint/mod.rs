//! # Fingerprint Module
//!
//! Reduces a [`Spectrum`](crate::spectrum::Spectrum) to a short list of
//! characteristic bands.
//!
//! ## Pipeline
//!
//! 1. [`baseline`]: subtract a smooth estimate of the signal floor. The window
//!    is given in axis units and converted with the mean sample spacing.
//! 2. [`noise`]: scaled median absolute deviation of the corrected signal.
//! 3. [`peaks`]: local maxima whose prominence exceeds
//!    `prominence_factor * noise`, thinned to `min_band_separation`.
//! 4. [`fit`]: Gaussian and Lorentzian least-squares fits per peak; the lower
//!    residual decides the band shape.
//! 5. Bands are sorted by center and packaged with the configuration.
//!
//! ## Example
//!
//! ```rust,no_run
//! use specfp::fingerprint::{FingerprintConfig, FingerprintExtractor};
//! # fn example(spectrum: &specfp::spectrum::Spectrum) -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = FingerprintExtractor::new(FingerprintConfig::default())?;
//! for band in extractor.extract(spectrum).iter() {
//!     println!("{:.2} {:?}", band.center(), band.shape());
//! }
//! # Ok(())
//! # }
//! ```

mod band;
mod config;
mod error;
mod extractor;

pub mod baseline;
pub mod fit;
pub mod noise;
pub mod peaks;


pub use band::{Band, BandShape, Fingerprint};
pub use config::{BaselineMethod, FingerprintConfig};
pub use error::FingerprintError;
pub use extractor::{Analysis, FingerprintExtractor};
