//! Local maxima, prominence and separation.

use std::cmp::Ordering;

/// A local maximum of the corrected signal together with its prominence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakCandidate {
    /// Sample index of the maximum (middle sample for plateaus)
    pub index: usize,
    /// Corrected signal value at `index`
    pub height: f64,
    /// Height above the higher of the two bounding minima
    pub prominence: f64,
    /// Index of the lowest sample on the left before the signal rises above `height`
    pub left_base: usize,
    /// Index of the lowest sample on the right before the signal rises above `height`
    pub right_base: usize,
}

/// Indices of local maxima.
///
/// The first and last samples are never maxima. A flat run counts once, at its
/// middle sample, when it is bounded by strictly lower samples on both sides.
pub fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if signal.len() < 3 {
        return maxima;
    }
    let last = signal.len() - 1;

    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

/// Prominence and bases of the maximum at `peak`.
///
/// Each side is searched outward until a strictly higher sample or the signal
/// edge; the lowest value met is that side's bounding minimum.
pub fn prominence(signal: &[f64], peak: usize) -> PeakCandidate {
    let height = signal[peak];

    let mut left_min = height;
    let mut left_base = peak;
    let mut i = peak;
    loop {
        if signal[i] > height {
            break;
        }
        if signal[i] < left_min {
            left_min = signal[i];
            left_base = i;
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let mut right_min = height;
    let mut right_base = peak;
    for (j, &v) in signal.iter().enumerate().skip(peak) {
        if v > height {
            break;
        }
        if v < right_min {
            right_min = v;
            right_base = j;
        }
    }

    PeakCandidate {
        index: peak,
        height,
        prominence: height - left_min.max(right_min),
        left_base,
        right_base,
    }
}

/// All local maxima whose prominence strictly exceeds `threshold`.
pub fn find_candidates(signal: &[f64], threshold: f64) -> Vec<PeakCandidate> {
    local_maxima(signal)
        .into_iter()
        .map(|peak| prominence(signal, peak))
        .filter(|candidate| candidate.prominence > threshold)
        .collect()
}

fn rank(a: &PeakCandidate, b: &PeakCandidate) -> Ordering {
    b.prominence
        .total_cmp(&a.prominence)
        .then_with(|| b.height.total_cmp(&a.height))
        .then_with(|| a.index.cmp(&b.index))
}

/// Greedy selection by descending prominence.
///
/// A candidate is kept when its axis position lies strictly farther than
/// `min_separation` from every candidate already kept. Ties in prominence go
/// to the taller peak, then to the lower index. The result is in index order.
pub fn select_separated(
    mut candidates: Vec<PeakCandidate>,
    x: &[f64],
    min_separation: f64,
) -> Vec<PeakCandidate> {
    candidates.sort_by(rank);

    let mut accepted: Vec<PeakCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let position = x[candidate.index];
        let clear = accepted
            .iter()
            .all(|kept| (x[kept.index] - position).abs() > min_separation);
        if clear {
            accepted.push(candidate);
        }
    }
    accepted.sort_by_key(|candidate| candidate.index);
    accepted
}
