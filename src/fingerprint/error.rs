use thiserror::Error;

/// Errors from the fingerprint pipeline.
///
/// Finding no bands is a valid outcome and is not represented here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FingerprintError {
    /// A configuration parameter is out of range
    #[error("Invalid fingerprint configuration: {0}")]
    InvalidConfig(String),

    /// Band parameters violate their invariants
    #[error("Invalid band: {0}")]
    InvalidBand(String),
}
