//! Waveform shape descriptors: symmetry, smoothness, periodicity and complexity.

use crate::config::defaults;
use crate::types::thresholds::waveform_thresholds as wt;
use crate::types::{WaveformResult, WaveformType};

use super::fft::{find_peaks, PeakCriteria};
use super::stats;

/// Shape analysis of a position trace sampled at `fps`.
pub struct WaveformAnalyzer {
    fps: f64,
}

impl WaveformAnalyzer {
    pub fn new(fps: f64) -> Self {
        Self { fps }
    }

    /// Describe the waveform of a trace.
    ///
    /// Shape descriptors and extrema use the smoothed trace; approximate
    /// entropy uses the raw one so that sample-level irregularity counts.
    pub fn analyze(&self, smoothed: &[f64], raw: &[f64]) -> WaveformResult {
        let symmetry = symmetry(smoothed);
        let smoothness = smoothness(smoothed);
        let periodicity = periodicity(smoothed, self.fps);
        let complexity = approximate_entropy(
            raw,
            defaults::APEN_EMBEDDING,
            defaults::APEN_TOLERANCE_FRACTION * stats::population_std(raw),
        );

        let extrema = Extrema::find(smoothed, self.min_extrema_distance());
        let waveform_type = classify_waveform(periodicity, smoothness, symmetry);

        tracing::debug!(
            symmetry = symmetry,
            smoothness = smoothness,
            periodicity = periodicity,
            complexity = complexity,
            waveform = %waveform_type,
            "Waveform analysis complete"
        );

        WaveformResult {
            symmetry,
            smoothness,
            periodicity,
            complexity,
            positive_peaks: extrema.positive.len(),
            negative_peaks: extrema.negative.len(),
            mean_positive_peak: extrema.mean_positive_height(smoothed),
            mean_negative_peak: extrema.mean_negative_depth(smoothed),
            waveform_type,
        }
    }

    fn min_extrema_distance(&self) -> usize {
        ((self.fps * defaults::EXTREMA_MIN_SEPARATION_SECS) as usize).max(1)
    }
}

/// `1 / (1 + |skew|)`; a constant signal counts as symmetric.
pub fn symmetry(signal: &[f64]) -> f64 {
    1.0 / (1.0 + stats::skewness(signal).abs())
}

/// `1 / (1 + var(second difference))`, 0 for fewer than 3 samples.
pub fn smoothness(signal: &[f64]) -> f64 {
    if signal.len() < 3 {
        return 0.0;
    }
    let second = stats::diff(&stats::diff(signal));
    1.0 / (1.0 + stats::population_variance(&second))
}

/// Normalized autocorrelation for lags `0..max_lag`, mean removed.
///
/// Empty when the signal has no variance.
pub fn autocorrelation(signal: &[f64], max_lag: usize) -> Vec<f64> {
    let n = signal.len();
    let centered = super::fft::detrend_mean(signal);
    let c0: f64 = centered.iter().map(|v| v * v).sum();
    if c0 <= defaults::NEAR_ZERO {
        return Vec::new();
    }

    (0..max_lag.min(n))
        .map(|lag| {
            centered[..n - lag]
                .iter()
                .zip(&centered[lag..])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / c0
        })
        .collect()
}

/// Height of the first autocorrelation peak at or above 0.3, excluding lag 0.
///
/// Lags up to 3 s are searched; peaks closer than 0.1 s are merged toward
/// the taller one. Returns 0 when no peak qualifies or the trace has fewer
/// than 10 samples.
pub fn periodicity(signal: &[f64], fps: f64) -> f64 {
    let n = signal.len();
    if n < defaults::PERIODICITY_MIN_SAMPLES {
        return 0.0;
    }

    let max_lag = ((defaults::PERIODICITY_MAX_LAG_SECS * fps) as usize).min(n);
    let corr = autocorrelation(signal, max_lag);
    if corr.len() < 2 {
        return 0.0;
    }

    let criteria = PeakCriteria {
        height: Some(defaults::PERIODICITY_MIN_HEIGHT),
        distance: Some(((fps * defaults::EXTREMA_MIN_SEPARATION_SECS) as usize).max(1)),
        prominence: None,
    };
    let lags = &corr[1..];
    find_peaks(lags, &criteria)
        .first()
        .map_or(0.0, |&p| lags[p])
}

/// Approximate entropy ApEn(m, r) of Pincus.
///
/// Each template counts itself as a match. Runs in O(n^2) time. Returns 0
/// when the signal is shorter than `m + 2` or the result is not finite.
pub fn approximate_entropy(signal: &[f64], m: usize, r: f64) -> f64 {
    if m == 0 || signal.len() < m + 2 {
        return 0.0;
    }

    let apen = phi(signal, m, r) - phi(signal, m + 1, r);
    if apen.is_finite() {
        apen
    } else {
        0.0
    }
}

fn phi(signal: &[f64], m: usize, r: f64) -> f64 {
    let count = signal.len() - m + 1;
    let templates: Vec<&[f64]> = (0..count).map(|i| &signal[i..i + m]).collect();

    let total: f64 = templates
        .iter()
        .map(|a| {
            let matches = templates
                .iter()
                .filter(|b| a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= r))
                .count();
            (matches as f64 / count as f64).ln()
        })
        .sum();
    total / count as f64
}

/// Six-way waveform label.
pub fn classify_waveform(periodicity: f64, smoothness: f64, symmetry: f64) -> WaveformType {
    if periodicity > wt::REGULAR_PERIODICITY && smoothness > wt::REGULAR_SMOOTHNESS {
        if symmetry > wt::SINUSOIDAL_SYMMETRY {
            WaveformType::RegularSinusoidal
        } else {
            WaveformType::RegularAsymmetric
        }
    } else if periodicity > wt::SEMI_REGULAR_PERIODICITY {
        if smoothness > wt::SEMI_REGULAR_SMOOTHNESS {
            WaveformType::SemiRegularSmooth
        } else {
            WaveformType::SemiRegularJagged
        }
    } else if smoothness > wt::IRREGULAR_SMOOTHNESS {
        WaveformType::IrregularSmooth
    } else {
        WaveformType::IrregularNoisy
    }
}

/// Indices of local maxima and minima at least `distance` samples apart.
struct Extrema {
    positive: Vec<usize>,
    negative: Vec<usize>,
}

impl Extrema {
    fn find(signal: &[f64], distance: usize) -> Self {
        let criteria = PeakCriteria {
            distance: Some(distance),
            ..PeakCriteria::default()
        };
        let inverted: Vec<f64> = signal.iter().map(|v| -v).collect();
        Self {
            positive: find_peaks(signal, &criteria),
            negative: find_peaks(&inverted, &criteria),
        }
    }

    fn mean_positive_height(&self, signal: &[f64]) -> f64 {
        let mean = stats::mean(signal);
        let heights: Vec<f64> = self.positive.iter().map(|&i| signal[i] - mean).collect();
        stats::mean(&heights)
    }

    fn mean_negative_depth(&self, signal: &[f64]) -> f64 {
        let mean = stats::mean(signal);
        let depths: Vec<f64> = self.negative.iter().map(|&i| mean - signal[i]).collect();
        stats::mean(&depths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, amp: f64, fps: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| amp * (2.0 * PI * freq * i as f64 / fps).sin())
            .collect()
    }

    #[test]
    fn test_sine_is_symmetric() {
        // Whole number of periods
        let s = sine(2.0, 30.0, 60.0, 300);
        assert!((symmetry(&s) - 1.0).abs() < 1e-9, "symmetry {}", symmetry(&s));
        assert_eq!(symmetry(&[4.0; 20]), 1.0);
    }

    #[test]
    fn test_smoothness_edge_cases() {
        assert_eq!(smoothness(&[1.0, 2.0]), 0.0);
        // Linear ramp has zero second difference
        let ramp: Vec<f64> = (0..20).map(|i| i as f64 * 3.0).collect();
        assert!((smoothness(&ramp) - 1.0).abs() < 1e-12);
        let jagged = [0.0, 10.0, 0.0, 10.0, 0.0, 10.0, 0.0];
        assert!(smoothness(&jagged) < 0.01);
    }

    #[test]
    fn test_periodicity_of_sine() {
        let s = sine(2.0, 10.0, 60.0, 600);
        let p = periodicity(&s, 60.0);
        println!("Periodicity: {p:.3}");
        // Biased estimate at a 30-sample lag: (600 - 30) / 600
        assert!((p - 0.95).abs() < 0.01, "periodicity {p}");
    }

    #[test]
    fn test_periodicity_short_or_flat() {
        assert_eq!(periodicity(&[1.0, 2.0, 3.0], 60.0), 0.0);
        assert_eq!(periodicity(&[7.0; 120], 60.0), 0.0);
    }

    #[test]
    fn test_approximate_entropy() {
        assert_eq!(approximate_entropy(&[1.0, 2.0, 3.0], 2, 0.1), 0.0);

        let regular = sine(3.0, 10.0, 60.0, 240);
        let r = 0.2 * stats::population_std(&regular);
        let apen_regular = approximate_entropy(&regular, 2, r);

        // Deterministic pseudo-random sequence
        let mut state = 12_345_u64;
        let noisy: Vec<f64> = (0..240)
            .map(|_| {
                state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                (state >> 33) as f64 / (1u64 << 31) as f64
            })
            .collect();
        let r = 0.2 * stats::population_std(&noisy);
        let apen_noisy = approximate_entropy(&noisy, 2, r);

        println!("ApEn regular {apen_regular:.3}, noisy {apen_noisy:.3}");
        assert!(apen_regular < apen_noisy, "noise should be more complex");
        assert!(apen_regular >= 0.0);
    }

    #[test]
    fn test_classify_waveform_table() {
        assert_eq!(classify_waveform(0.9, 0.9, 0.9), WaveformType::RegularSinusoidal);
        assert_eq!(classify_waveform(0.9, 0.9, 0.5), WaveformType::RegularAsymmetric);
        assert_eq!(classify_waveform(0.9, 0.6, 0.9), WaveformType::SemiRegularSmooth);
        assert_eq!(classify_waveform(0.5, 0.4, 0.9), WaveformType::SemiRegularJagged);
        assert_eq!(classify_waveform(0.1, 0.8, 0.9), WaveformType::IrregularSmooth);
        assert_eq!(classify_waveform(0.1, 0.2, 0.9), WaveformType::IrregularNoisy);
    }

    #[test]
    fn test_analyze_slow_sine() {
        let s = sine(1.0, 2.0, 60.0, 600);
        let result = WaveformAnalyzer::new(60.0).analyze(&s, &s);
        assert_eq!(result.waveform_type, WaveformType::RegularSinusoidal);
        assert_eq!(result.positive_peaks, 10, "one crest per second");
        assert_eq!(result.negative_peaks, 10, "one trough per second");
        assert!((result.mean_positive_peak - 2.0).abs() < 0.05);
        assert!((result.mean_negative_peak - 2.0).abs() < 0.05);
    }
}
