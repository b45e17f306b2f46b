//! Local line-shape fitting.
//!
//! Each accepted peak is fitted with every [`PeakModel`] over a window around
//! the peak using damped least squares (Levenberg-Marquardt). The model with
//! the lower residual wins; when no model converges the band is described by
//! direct estimates and marked [`BandShape::Unresolved`].

use std::f64::consts::{LN_2, PI};

use log::trace;

use super::band::{Band, BandShape};
use super::config::FingerprintConfig;
use super::error::FingerprintError;
use super::peaks::PeakCandidate;

const LAMBDA_INITIAL: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e12;
const DAMPING_FLOOR: f64 = 1e-12;

/// Parameter vector: height, center, width (model specific).
pub type Params = [f64; 3];

/// A three-parameter peak profile.
pub trait PeakModel: Sync {
    /// Shape reported when this model wins
    fn shape(&self) -> BandShape;

    /// Profile value at `x`
    fn evaluate(&self, x: f64, params: &Params) -> f64;

    /// Partial derivatives with respect to height, center and width at `x`
    fn gradient(&self, x: f64, params: &Params) -> Params;

    /// Width parameter corresponding to a full width at half maximum
    fn width_from_fwhm(&self, fwhm: f64) -> f64;

    /// Full width at half maximum for a width parameter
    fn fwhm(&self, width: f64) -> f64;

    /// Integrated area
    fn area(&self, height: f64, width: f64) -> f64;
}

/// `h * exp(-(x - c)^2 / (2 sigma^2))`
#[derive(Debug, Clone, Copy, Default)]
pub struct Gaussian;

/// `h / (1 + ((x - c) / gamma)^2)`
#[derive(Debug, Clone, Copy, Default)]
pub struct Lorentzian;

fn gaussian_fwhm_factor() -> f64 {
    2.0 * (2.0 * LN_2).sqrt()
}

impl PeakModel for Gaussian {
    fn shape(&self) -> BandShape {
        BandShape::Gaussian
    }

    fn evaluate(&self, x: f64, [h, c, sigma]: &Params) -> f64 {
        let d = x - c;
        h * (-(d * d) / (2.0 * sigma * sigma)).exp()
    }

    fn gradient(&self, x: f64, [h, c, sigma]: &Params) -> Params {
        let d = x - c;
        let s2 = sigma * sigma;
        let e = (-(d * d) / (2.0 * s2)).exp();
        [e, h * e * d / s2, h * e * d * d / (s2 * sigma)]
    }

    fn width_from_fwhm(&self, fwhm: f64) -> f64 {
        fwhm / gaussian_fwhm_factor()
    }

    fn fwhm(&self, sigma: f64) -> f64 {
        gaussian_fwhm_factor() * sigma
    }

    fn area(&self, height: f64, sigma: f64) -> f64 {
        height * sigma * (2.0 * PI).sqrt()
    }
}

impl PeakModel for Lorentzian {
    fn shape(&self) -> BandShape {
        BandShape::Lorentzian
    }

    fn evaluate(&self, x: f64, [h, c, gamma]: &Params) -> f64 {
        let u = (x - c) / gamma;
        h / (1.0 + u * u)
    }

    fn gradient(&self, x: f64, [h, c, gamma]: &Params) -> Params {
        let u = (x - c) / gamma;
        let q = 1.0 + u * u;
        let common = 2.0 * h * u / (gamma * q * q);
        [1.0 / q, common, common * u]
    }

    fn width_from_fwhm(&self, fwhm: f64) -> f64 {
        fwhm / 2.0
    }

    fn fwhm(&self, gamma: f64) -> f64 {
        2.0 * gamma
    }

    fn area(&self, height: f64, gamma: f64) -> f64 {
        PI * height * gamma
    }
}

/// Models tried for every band, in tie-breaking order.
pub static MODELS: [&dyn PeakModel; 2] = [&Gaussian, &Lorentzian];

/// Iteration limits for [`levenberg_marquardt`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Maximum accepted steps
    pub max_iterations: usize,
    /// Relative residual improvement that ends the iteration
    pub tolerance: f64,
}

impl From<&FingerprintConfig> for FitOptions {
    fn from(config: &FingerprintConfig) -> Self {
        Self {
            max_iterations: config.fit_max_iterations,
            tolerance: config.fit_tolerance,
        }
    }
}

/// Outcome of one model fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    /// Final parameters
    pub params: Params,
    /// Sum of squared residuals at `params`
    pub ssr: f64,
    /// Accepted steps taken
    pub iterations: usize,
    /// Whether the iteration stopped on the tolerance rather than the cap
    pub converged: bool,
}

impl FitResult {
    /// Converged with finite, physically meaningful parameters and the center
    /// inside `[lo, hi]`.
    pub fn is_acceptable(&self, lo: f64, hi: f64) -> bool {
        let [h, c, w] = self.params;
        self.converged
            && self.ssr.is_finite()
            && h.is_finite()
            && c.is_finite()
            && w.is_finite()
            && w > 0.0
            && h >= 0.0
            && c >= lo
            && c <= hi
    }
}

fn sum_squared_residuals(model: &dyn PeakModel, x: &[f64], y: &[f64], params: &Params) -> f64 {
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let r = yi - model.evaluate(xi, params);
            r * r
        })
        .sum()
}

fn normal_equations(
    model: &dyn PeakModel,
    x: &[f64],
    y: &[f64],
    params: &Params,
) -> ([[f64; 3]; 3], [f64; 3]) {
    let mut jtj = [[0.0; 3]; 3];
    let mut jtr = [0.0; 3];
    for (&xi, &yi) in x.iter().zip(y) {
        let g = model.gradient(xi, params);
        let r = yi - model.evaluate(xi, params);
        for row in 0..3 {
            jtr[row] += g[row] * r;
            for col in 0..3 {
                jtj[row][col] += g[row] * g[col];
            }
        }
    }
    (jtj, jtr)
}

/// Solve a 3x3 linear system by Gaussian elimination with partial pivoting.
pub fn solve3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let mut pivot = col;
        for row in col + 1..3 {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        let magnitude = a[pivot][col].abs();
        if magnitude.is_nan() || magnitude < f64::MIN_POSITIVE {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut solution = [0.0; 3];
    for row in (0..3).rev() {
        let mut acc = b[row];
        for k in row + 1..3 {
            acc -= a[row][k] * solution[k];
        }
        solution[row] = acc / a[row][row];
    }
    solution
        .iter()
        .all(|v| v.is_finite())
        .then_some(solution)
}

/// Fit `model` to the points `(x, y)` starting from `initial`.
pub fn levenberg_marquardt(
    model: &dyn PeakModel,
    x: &[f64],
    y: &[f64],
    initial: Params,
    options: &FitOptions,
) -> FitResult {
    let mut params = initial;
    let mut ssr = sum_squared_residuals(model, x, y, &params);
    let floor = f64::EPSILON * y.iter().map(|v| v * v).sum::<f64>();
    let mut lambda = LAMBDA_INITIAL;
    let mut iterations = 0;
    let mut converged = false;

    if !ssr.is_finite() {
        return FitResult {
            params,
            ssr,
            iterations,
            converged,
        };
    }

    while iterations < options.max_iterations {
        let (jtj, jtr) = normal_equations(model, x, y, &params);

        let mut step = None;
        while lambda <= LAMBDA_MAX {
            let mut damped = jtj;
            for k in 0..3 {
                damped[k][k] += lambda * jtj[k][k].max(DAMPING_FLOOR);
            }
            if let Some(delta) = solve3(damped, jtr) {
                let trial = [
                    params[0] + delta[0],
                    params[1] + delta[1],
                    params[2] + delta[2],
                ];
                if trial.iter().all(|v| v.is_finite()) && trial[2] > 0.0 {
                    let trial_ssr = sum_squared_residuals(model, x, y, &trial);
                    if trial_ssr.is_finite() && trial_ssr < ssr {
                        step = Some((trial, trial_ssr));
                        lambda = (lambda / 10.0).max(LAMBDA_MIN);
                        break;
                    }
                }
            }
            lambda *= 10.0;
        }

        let Some((trial, trial_ssr)) = step else {
            // No downhill direction left
            converged = true;
            break;
        };

        iterations += 1;
        let gain = ssr - trial_ssr;
        let previous = ssr;
        params = trial;
        ssr = trial_ssr;
        trace!(
            "{:?} iteration {}: ssr {:.6e}, lambda {:.1e}",
            model.shape(),
            iterations,
            ssr,
            lambda
        );

        if gain <= options.tolerance * previous || ssr <= floor {
            converged = true;
            break;
        }
    }

    FitResult {
        params,
        ssr,
        iterations,
        converged,
    }
}

/// Full width at half maximum measured directly on the corrected signal,
/// interpolating the half-height crossings and stopping at the peak bases.
pub fn half_max_width(x: &[f64], signal: &[f64], peak: &PeakCandidate) -> f64 {
    let p = peak.index;
    let half = peak.height / 2.0;

    let mut i = p;
    while i > peak.left_base && signal[i] > half {
        i -= 1;
    }
    let left = if i < p && signal[i] <= half {
        let t = (half - signal[i]) / (signal[i + 1] - signal[i]);
        x[i] + t * (x[i + 1] - x[i])
    } else {
        x[i]
    };

    let mut j = p;
    while j < peak.right_base && signal[j] > half {
        j += 1;
    }
    let right = if j > p && signal[j] <= half {
        let t = (signal[j - 1] - half) / (signal[j - 1] - signal[j]);
        x[j - 1] + t * (x[j] - x[j - 1])
    } else {
        x[j]
    };

    let width = right - left;
    if width > 0.0 {
        width
    } else {
        x[p + 1] - x[p - 1]
    }
}

/// Inclusive sample range fitted for `peak`: at most `factor * fwhm` either
/// side of the peak, never past the peak bases, and always the peak with both
/// neighbours.
pub fn fit_window(x: &[f64], peak: &PeakCandidate, fwhm: f64, factor: f64) -> (usize, usize) {
    let p = peak.index;
    let reach = factor * fwhm;
    let lo = x[p] - reach;
    let hi = x[p] + reach;

    let start = (peak.left_base..p)
        .find(|&i| x[i] >= lo)
        .unwrap_or(p - 1)
        .min(p - 1);
    let end = (p + 1..=peak.right_base)
        .rev()
        .find(|&i| x[i] <= hi)
        .unwrap_or(p + 1)
        .max(p + 1);
    (start, end)
}

fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (ys[0] + ys[1]) * (xs[1] - xs[0]))
        .sum()
}

fn parabolic_center(x: &[f64], signal: &[f64], p: usize) -> f64 {
    let (s0, s1, s2) = (signal[p - 1], signal[p], signal[p + 1]);
    let curvature = s0 - 2.0 * s1 + s2;
    if curvature < 0.0 {
        let offset = (0.5 * (s0 - s2) / curvature).clamp(-0.5, 0.5);
        x[p] + offset * (x[p + 1] - x[p - 1]) / 2.0
    } else {
        x[p]
    }
}

/// Describe `peak` as a band.
///
/// `x` must be ascending and `signal` baseline corrected; the peak must not
/// sit on either edge.
pub fn resolve_band(
    x: &[f64],
    signal: &[f64],
    peak: &PeakCandidate,
    config: &FingerprintConfig,
) -> Result<Band, FingerprintError> {
    let p = peak.index;
    let fwhm = half_max_width(x, signal, peak);
    let (start, end) = fit_window(x, peak, fwhm, config.fit_window_factor);
    let wx = &x[start..=end];
    let wy = &signal[start..=end];
    let options = FitOptions::from(config);

    let mut best: Option<(&dyn PeakModel, FitResult)> = None;
    for &model in MODELS.iter() {
        let initial = [peak.height, x[p], model.width_from_fwhm(fwhm)];
        let fit = levenberg_marquardt(model, wx, wy, initial, &options);
        trace!(
            "{:?} fit at {:.4}: params {:?}, ssr {:.6e}, converged {}",
            model.shape(),
            x[p],
            fit.params,
            fit.ssr,
            fit.converged
        );
        if !fit.is_acceptable(wx[0], wx[wx.len() - 1]) {
            continue;
        }
        if best.map_or(true, |(_, current)| fit.ssr < current.ssr) {
            best = Some((model, fit));
        }
    }

    if let Some((model, fit)) = best {
        let [h, c, w] = fit.params;
        match Band::new(c, model.fwhm(w), h, model.area(h, w), model.shape()) {
            Ok(band) => return Ok(band),
            Err(e) => trace!("Discarding {:?} fit: {}", model.shape(), e),
        }
    }

    Band::new(
        parabolic_center(x, signal, p),
        fwhm,
        peak.height,
        trapezoid(wx, wy),
        BandShape::Unresolved,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(model: &dyn PeakModel, params: Params) -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..81).map(|i| 80.0 + i as f64 * 0.5).collect();
        let y = x.iter().map(|&xi| model.evaluate(xi, &params)).collect();
        (x, y)
    }

    #[test]
    fn test_solve3() {
        let a = [[2.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 4.0]];
        let expected = [1.0, -2.0, 3.0];
        let b = [0.0, -2.0, 10.0];
        let solution = solve3(a, b).unwrap();
        for (s, e) in solution.iter().zip(expected) {
            assert!((s - e).abs() < 1e-12);
        }
        assert!(solve3([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]], [1.0; 3]).is_none());
    }

    #[test]
    fn test_model_areas_and_widths() {
        assert!((Gaussian.fwhm(1.0) - 2.354_820_045).abs() < 1e-8);
        assert!((Gaussian.area(1.0, 1.0) - (2.0 * PI).sqrt()).abs() < 1e-12);
        assert_eq!(Lorentzian.fwhm(1.5), 3.0);
        assert!((Lorentzian.area(2.0, 1.0) - 2.0 * PI).abs() < 1e-12);
        assert!((Gaussian.fwhm(Gaussian.width_from_fwhm(7.0)) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_recovers_gaussian_parameters() {
        let truth = [10.0, 100.0, 3.0];
        let (x, y) = sample(&Gaussian, truth);
        let options = FitOptions {
            max_iterations: 200,
            tolerance: 1e-12,
        };
        let fit = levenberg_marquardt(&Gaussian, &x, &y, [8.0, 100.4, 4.0], &options);
        assert!(fit.converged);
        assert!((fit.params[0] - 10.0).abs() < 1e-4);
        assert!((fit.params[1] - 100.0).abs() < 1e-4);
        assert!((fit.params[2] - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_recovers_lorentzian_parameters() {
        let truth = [4.0, 97.5, 2.0];
        let (x, y) = sample(&Lorentzian, truth);
        let options = FitOptions {
            max_iterations: 200,
            tolerance: 1e-12,
        };
        let fit = levenberg_marquardt(&Lorentzian, &x, &y, [3.5, 98.0, 1.5], &options);
        assert!(fit.converged);
        assert!((fit.params[1] - 97.5).abs() < 1e-4);
        assert!((fit.params[2] - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_acceptability_checks_window() {
        let fit = FitResult {
            params: [1.0, 5.0, 1.0],
            ssr: 0.0,
            iterations: 3,
            converged: true,
        };
        assert!(fit.is_acceptable(0.0, 10.0));
        assert!(!fit.is_acceptable(6.0, 10.0));
        assert!(!FitResult {
            converged: false,
            ..fit
        }
        .is_acceptable(0.0, 10.0));
        assert!(!FitResult {
            params: [1.0, 5.0, -1.0],
            ..fit
        }
        .is_acceptable(0.0, 10.0));
    }

    #[test]
    fn test_half_max_width_interpolates() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let signal = [0.0, 2.0, 4.0, 2.0, 0.0];
        let peak = PeakCandidate {
            index: 2,
            height: 4.0,
            prominence: 4.0,
            left_base: 0,
            right_base: 4,
        };
        assert!((half_max_width(&x, &signal, &peak) - 2.0).abs() < 1e-12);
        assert_eq!(fit_window(&x, &peak, 2.0, 3.0), (0, 4));
        assert_eq!(fit_window(&x, &peak, 0.1, 1.0), (1, 3));
    }

    #[test]
    fn test_parabolic_center_shifts_toward_taller_neighbour() {
        let x = [0.0, 1.0, 2.0];
        let center = parabolic_center(&x, &[1.0, 4.0, 3.0], 1);
        assert!(center > 1.0 && center < 1.5);
    }
}
