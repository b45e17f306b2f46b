use thiserror::Error;

/// Errors raised while reducing decoded fragments to a [`Spectrum`](super::Spectrum).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    /// Axis or intensity block absent from a structurally valid file
    #[error("Missing required {block} block")]
    MissingRequiredBlock {
        /// Which block kind is missing ("axis" or "intensity")
        block: &'static str,
    },

    /// More than one axis or intensity block
    #[error("Duplicate {block} block")]
    DuplicateBlock {
        /// Which block kind was repeated
        block: &'static str,
    },

    /// Axis and intensity sample counts disagree
    #[error("Dimension mismatch: axis has {axis} samples, intensity has {intensity}")]
    DimensionMismatch {
        /// Axis sample count
        axis: usize,
        /// Intensity sample count
        intensity: usize,
    },

    /// Axis is degenerate, non-finite or not strictly monotonic
    #[error("Invalid axis: {0}")]
    InvalidAxis(String),

    /// Intensity sample is NaN or infinite
    #[error("Invalid intensity {value} at index {index}")]
    InvalidIntensity {
        /// Sample index
        index: usize,
        /// Offending value
        value: f64,
    },
}
