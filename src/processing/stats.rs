//! Descriptive statistics over `f64` slices.
//!
//! Every function returns a finite sentinel (0, or 1 for p-values) on
//! empty or degenerate input instead of NaN, so report generation can
//! always proceed.

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::{Data, Median, Statistics};

use crate::config::defaults::NEAR_ZERO;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().mean()
}

/// Population variance (divides by n).
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().population_variance()
}

/// Population standard deviation (divides by n).
pub fn population_std(values: &[f64]) -> f64 {
    population_variance(values).sqrt()
}

/// Sample standard deviation (divides by n - 1), 0 for fewer than 2 values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().std_dev()
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Data::new(values.to_vec()).median()
}

pub fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// max - min
pub fn range(values: &[f64]) -> f64 {
    max(values) - min(values)
}

/// Root mean square of the deviations from the mean.
pub fn rms_about_mean(values: &[f64]) -> f64 {
    population_std(values)
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is in percent (0-100).
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Central moment of order `k` (biased, divides by n).
fn central_moment(values: &[f64], k: i32) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(k)).sum::<f64>() / values.len() as f64
}

/// Biased skewness `m3 / m2^1.5`, 0 for a constant series.
pub fn skewness(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m2 = central_moment(values, 2);
    if m2 <= NEAR_ZERO {
        return 0.0;
    }
    central_moment(values, 3) / m2.powf(1.5)
}

/// Biased excess (Fisher) kurtosis `m4 / m2^2 - 3`, 0 for a constant series.
pub fn kurtosis(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m2 = central_moment(values, 2);
    if m2 <= NEAR_ZERO {
        return 0.0;
    }
    central_moment(values, 4) / (m2 * m2) - 3.0
}

/// Pearson correlation coefficient.
///
/// Returns 0 when either series is constant or the lengths differ.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n != y.len() || n < 2 {
        return 0.0;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom <= NEAR_ZERO {
        return 0.0;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

/// Two-sided p-value for a Pearson `r` over `n` pairs (t-test, n - 2 dof).
pub fn pearson_p_value(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }
    if r.abs() >= 1.0 {
        return 0.0;
    }

    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => 1.0,
    }
}

/// First difference `x[i+1] - x[i]`.
pub fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Sign as -1, 0 or 1 (0 stays 0).
pub fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Positions `i` where `sign(v[i+1]) != sign(v[i])`.
pub fn sign_change_points(values: &[f64]) -> Vec<usize> {
    values
        .windows(2)
        .enumerate()
        .filter(|(_, w)| sign(w[0]) != sign(w[1]))
        .map(|(i, _)| i)
        .collect()
}

/// Share of values satisfying `pred`, 0 for an empty slice.
pub fn fraction<F>(values: &[f64], pred: F) -> f64
where
    F: Fn(f64) -> bool,
{
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&v| pred(v)).count() as f64 / values.len() as f64
}

/// Centered rolling mean; positions without a full window are `None`.
///
/// For even windows the extra sample sits on the left, matching the usual
/// dataframe convention.
pub fn rolling_mean_centered(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    if window == 0 {
        return vec![None; n];
    }
    let offset = (window - 1) / 2;

    (0..n)
        .map(|i| {
            let end = i + offset + 1;
            if end > n || end < window {
                return None;
            }
            let start = end - window;
            Some(values[start..end].iter().sum::<f64>() / window as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(population_std(&[]), 0.0);
        assert_eq!(sample_std(&[1.0]), 0.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
        assert_eq!(range(&[]), 0.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&v, 75.0) - 3.25).abs() < 1e-12);
        assert!((percentile(&v, 10.0) - 1.3).abs() < 1e-12);
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 100.0), 4.0);
    }

    #[test]
    fn test_std_variants() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std(&v) - 2.0).abs() < 1e-12);
        assert!((sample_std(&v) - 2.138_089_935).abs() < 1e-9);
    }

    #[test]
    fn test_skew_and_kurtosis() {
        // Symmetric series has zero skew
        assert!(skewness(&[-2.0, -1.0, 0.0, 1.0, 2.0]).abs() < 1e-12);
        // Constant series is guarded
        assert_eq!(skewness(&[3.0; 6]), 0.0);
        assert_eq!(kurtosis(&[3.0; 6]), 0.0);
        // Right tail gives positive skew
        assert!(skewness(&[0.0, 0.0, 0.0, 0.0, 10.0]) > 1.0);
        // Two-point distribution has excess kurtosis -2
        assert!((kurtosis(&[-1.0, 1.0, -1.0, 1.0]) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
        let neg: Vec<f64> = y.iter().map(|v| -v).collect();
        assert!((pearson(&x, &neg) + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&x, &[1.0; 5]), 0.0, "constant series is undefined, reported as 0");
    }

    #[test]
    fn test_p_value() {
        assert_eq!(pearson_p_value(1.0, 10), 0.0);
        assert_eq!(pearson_p_value(0.5, 2), 1.0);
        let p = pearson_p_value(0.0, 30);
        assert!((p - 1.0).abs() < 1e-9, "r = 0 gives p = 1, got {p}");
        let strong = pearson_p_value(0.9, 30);
        assert!(strong < 1e-6, "strong correlation should be significant, got {strong}");
    }

    #[test]
    fn test_sign_changes() {
        let v = [1.0, 2.0, -1.0, -3.0, 0.0, 4.0];
        assert_eq!(sign_change_points(&v), vec![1, 3, 4]);
    }

    #[test]
    fn test_rolling_mean_centered() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        let r3 = rolling_mean_centered(&v, 3);
        assert_eq!(r3, vec![None, Some(2.0), Some(3.0), Some(4.0), None]);

        let r4 = rolling_mean_centered(&v, 4);
        assert_eq!(r4, vec![None, None, Some(2.5), Some(3.5), None]);
    }
}
