//! Baseline estimation.
//!
//! Both estimators return a baseline that never exceeds the signal, so the
//! corrected signal `y - baseline` is non-negative everywhere.

use super::config::BaselineMethod;

/// Centered moving average with a window truncated at the edges.
///
/// Sums run over deviations from the first sample, so a constant signal
/// averages to itself exactly.
pub fn moving_average(values: &[f64], half_window: usize) -> Vec<f64> {
    let n = values.len();
    let origin = values.first().copied().unwrap_or(0.0);
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    let mut running = 0.0;
    for &v in values {
        running += v - origin;
        prefix.push(running);
    }

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half_window);
            let hi = (i + half_window).min(n - 1);
            origin + (prefix[hi + 1] - prefix[lo]) / (hi - lo + 1) as f64
        })
        .collect()
}

/// Centered rolling minimum with a window truncated at the edges.
pub fn rolling_min(values: &[f64], half_window: usize) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half_window);
            let hi = (i + half_window).min(n - 1);
            values[lo..=hi].iter().copied().fold(f64::INFINITY, f64::min)
        })
        .collect()
}

/// Estimate the baseline of `y`.
pub fn estimate(y: &[f64], half_window: usize, method: BaselineMethod, iterations: usize) -> Vec<f64> {
    if y.is_empty() {
        return Vec::new();
    }

    match method {
        BaselineMethod::RollingMin => {
            let envelope = rolling_min(y, half_window);
            let mut baseline = moving_average(&envelope, half_window);
            for (b, &v) in baseline.iter_mut().zip(y) {
                *b = b.min(v);
            }
            baseline
        }
        BaselineMethod::AsymmetricSmoothing => {
            let mut baseline = y.to_vec();
            for _ in 0..iterations {
                let smoothed = moving_average(&baseline, half_window);
                for (b, s) in baseline.iter_mut().zip(smoothed) {
                    *b = b.min(s);
                }
            }
            baseline
        }
    }
}

/// Subtract `baseline` from `y`, clamping tiny negative residue to zero.
pub fn correct(y: &[f64], baseline: &[f64]) -> Vec<f64> {
    y.iter()
        .zip(baseline)
        .map(|(&v, &b)| (v - b).max(0.0))
        .collect()
}
