//! Robust noise estimation.

/// Scale factor turning a median absolute deviation into a Gaussian sigma.
pub const MAD_SCALE: f64 = 1.4826;

/// Smallest prominence, relative to the largest intensity magnitude, that can
/// count as a peak. Anything below is floating-point rounding.
pub const RESOLUTION_FLOOR: f64 = 1024.0 * f64::EPSILON;

/// Median of `values`; the mean of the middle pair for even lengths, `0.0` when empty.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Noise level of a baseline-corrected signal as a scaled median absolute deviation.
pub fn estimate(signal: &[f64]) -> f64 {
    let center = median(signal);
    let deviations: Vec<f64> = signal.iter().map(|v| (v - center).abs()).collect();
    MAD_SCALE * median(&deviations)
}

/// Prominence floor for `signal`: [`RESOLUTION_FLOOR`] times its largest magnitude.
pub fn resolution_floor(signal: &[f64]) -> f64 {
    RESOLUTION_FLOOR * signal.iter().fold(0.0f64, |acc, v| acc.max(v.abs()))
}
