//! FFT computation using rustfft
//!
//! Magnitude spectra of short gaze traces plus the peak picking used by the
//! frequency and waveform analyzers.
//!
//! # Features
//!
//! - Hann windowing
//! - Positive-frequency magnitude spectrum (bins `1..=(n-1)/2`)
//! - Local-maximum peak detection with height, distance and prominence filters
//!
//! # Example
//!
//! ```ignore
//! use nystagmus_analyzer::processing::{compute_spectrum, find_peaks, PeakCriteria};
//!
//! let spectrum = compute_spectrum(&trace, 60.0, true)?;
//! let peaks = find_peaks(&spectrum.magnitudes, &PeakCriteria::default());
//! ```

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use super::ProcessingError;

// ============================================================================
// Spectrum
// ============================================================================

/// Positive-frequency magnitude spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencySpectrum {
    /// Bin centre frequencies (Hz), strictly positive
    pub frequencies: Vec<f64>,
    /// |X(k)| at each frequency
    pub magnitudes: Vec<f64>,
    /// Bin spacing (Hz)
    pub resolution: f64,
    pub sample_rate: f64,
}

impl FrequencySpectrum {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Power (magnitude squared) at each bin.
    pub fn power(&self) -> Vec<f64> {
        self.magnitudes.iter().map(|m| m * m).collect()
    }

    /// Indices of bins inside `[low, high]`.
    pub fn band_indices(&self, low: f64, high: f64) -> Vec<usize> {
        self.frequencies
            .iter()
            .enumerate()
            .filter(|(_, &f)| f >= low && f <= high)
            .map(|(i, _)| i)
            .collect()
    }

    /// Bin with the largest magnitude inside `[low, high]`.
    pub fn peak_in_band(&self, low: f64, high: f64) -> Option<(f64, f64)> {
        self.frequencies
            .iter()
            .zip(self.magnitudes.iter())
            .filter(|(&f, _)| f >= low && f <= high)
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(&f, &m)| (f, m))
    }
}

/// Symmetric Hann window, `0.5 - 0.5 cos(2 pi i / (n - 1))`.
pub fn hann_window(n: usize) -> Vec<f64> {
    use std::f64::consts::PI;
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (n - 1) as f64;
            (0..n)
                .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / denom).cos())
                .collect()
        }
    }
}

/// Remove the mean of a trace.
pub fn detrend_mean(samples: &[f64]) -> Vec<f64> {
    let mean = super::stats::mean(samples);
    samples.iter().map(|s| s - mean).collect()
}

/// Compute the positive-frequency magnitude spectrum of a trace.
///
/// The mean is removed first; `windowed` applies a Hann window. Only
/// bins strictly between DC and Nyquist are returned.
///
/// # Errors
/// Fails when `samples` is empty or `sample_rate` is not positive.
pub fn compute_spectrum(
    samples: &[f64],
    sample_rate: f64,
    windowed: bool,
) -> Result<FrequencySpectrum, ProcessingError> {
    if samples.is_empty() {
        return Err(ProcessingError::InsufficientData {
            needed: 1,
            available: 0,
        });
    }
    if sample_rate <= 0.0 || !sample_rate.is_finite() {
        return Err(ProcessingError::InvalidSamplingRate(sample_rate));
    }

    let n = samples.len();
    let centered = detrend_mean(samples);
    let mut buffer: Vec<Complex<f64>> = if windowed {
        centered
            .iter()
            .zip(hann_window(n))
            .map(|(&x, w)| Complex::new(x * w, 0.0))
            .collect()
    } else {
        centered.iter().map(|&x| Complex::new(x, 0.0)).collect()
    };

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let resolution = sample_rate / n as f64;
    let positive = (n - 1) / 2;
    let frequencies = (1..=positive).map(|k| k as f64 * resolution).collect();
    let magnitudes = buffer[1..=positive].iter().map(|c| c.norm()).collect();

    Ok(FrequencySpectrum {
        frequencies,
        magnitudes,
        resolution,
        sample_rate,
    })
}

// ============================================================================
// Peak Detection
// ============================================================================

/// Filters applied to local maxima.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeakCriteria {
    /// Minimum peak value
    pub height: Option<f64>,
    /// Minimum spacing between kept peaks (samples); taller peaks win
    pub distance: Option<usize>,
    /// Minimum prominence
    pub prominence: Option<f64>,
}

/// Find local maxima of `values` and filter them.
///
/// A flat-topped peak is reported at the middle of its plateau. Filters run
/// in order: height, distance, prominence. Returned indices are ascending.
pub fn find_peaks(values: &[f64], criteria: &PeakCriteria) -> Vec<usize> {
    let mut peaks = local_maxima(values);

    if let Some(h) = criteria.height {
        peaks.retain(|&p| values[p] >= h);
    }

    if let Some(d) = criteria.distance.filter(|&d| d > 1) {
        peaks = enforce_distance(values, &peaks, d);
    }

    if let Some(min_prom) = criteria.prominence {
        peaks.retain(|&p| prominence(values, p) >= min_prom);
    }

    peaks
}

fn local_maxima(values: &[f64]) -> Vec<usize> {
    let n = values.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }

    let mut i = 1;
    while i < n - 1 {
        if values[i - 1] < values[i] {
            // Walk across a possible plateau
            let mut ahead = i + 1;
            while ahead < n - 1 && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                let left_edge = i;
                let right_edge = ahead - 1;
                peaks.push((left_edge + right_edge) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    peaks
}

fn enforce_distance(values: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    let mut keep = vec![true; peaks.len()];

    // Visit peaks from tallest to shortest
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| {
        values[peaks[b]]
            .partial_cmp(&values[peaks[a]])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    for &i in &order {
        if !keep[i] {
            continue;
        }
        for (j, kept) in keep.iter_mut().enumerate() {
            if j != i && *kept && peaks[i].abs_diff(peaks[j]) < distance {
                *kept = false;
            }
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Topographic prominence of the peak at `peak`.
///
/// On each side, search outward until a strictly higher sample or the
/// signal edge; the reference level is the higher of the two side minima.
pub fn prominence(values: &[f64], peak: usize) -> f64 {
    let height = values[peak];

    let mut left_min = height;
    for &v in values[..peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &values[peak + 1..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_hann_window() {
        let w = hann_window(5);
        assert!((w[0]).abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
        assert!((w[4]).abs() < 1e-12);
        assert_eq!(hann_window(1), vec![1.0]);
    }

    #[test]
    fn test_spectrum_of_pure_tone() {
        let fps = 60.0;
        let n = 120;
        let samples: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 5.0 * i as f64 / fps).sin())
            .collect();

        let spectrum = compute_spectrum(&samples, fps, true).expect("FFT should succeed");
        assert_eq!(spectrum.len(), 59, "bins 1..=59 for n = 120");
        assert!((spectrum.resolution - 0.5).abs() < 1e-12);

        let (freq, _) = spectrum.peak_in_band(0.5, 15.0).expect("in-band peak");
        println!("Peak frequency: {freq:.2} Hz");
        assert!((freq - 5.0).abs() < 1e-9, "expected 5 Hz, got {freq}");
    }

    #[test]
    fn test_spectrum_errors() {
        assert!(matches!(
            compute_spectrum(&[], 60.0, true),
            Err(ProcessingError::InsufficientData { .. })
        ));
        assert!(matches!(
            compute_spectrum(&[1.0, 2.0], 0.0, true),
            Err(ProcessingError::InvalidSamplingRate(_))
        ));
    }

    #[test]
    fn test_short_spectrum_is_empty() {
        let spectrum = compute_spectrum(&[1.0, 2.0], 60.0, false).expect("FFT should succeed");
        assert!(spectrum.is_empty());
    }

    #[test]
    fn test_find_local_maxima() {
        let v = [0.0, 2.0, 1.0, 3.0, 3.0, 3.0, 0.0, 5.0];
        assert_eq!(find_peaks(&v, &PeakCriteria::default()), vec![1, 4]);
    }

    #[test]
    fn test_height_filter() {
        let v = [0.0, 2.0, 0.0, 5.0, 0.0];
        let peaks = find_peaks(
            &v,
            &PeakCriteria {
                height: Some(3.0),
                ..PeakCriteria::default()
            },
        );
        assert_eq!(peaks, vec![3]);
    }

    #[test]
    fn test_distance_keeps_taller_peak() {
        let v = [0.0, 3.0, 0.0, 5.0, 0.0, 1.0, 0.0, 0.0, 4.0, 0.0];
        let peaks = find_peaks(
            &v,
            &PeakCriteria {
                distance: Some(3),
                ..PeakCriteria::default()
            },
        );
        assert_eq!(peaks, vec![3, 8]);
    }

    #[test]
    fn test_prominence() {
        let v = [0.0, 4.0, 3.0, 5.0, 1.0];
        // Peak at 1 is bounded by the taller peak at 3; base is max(0, 3)
        assert!((prominence(&v, 1) - 1.0).abs() < 1e-12);
        // Tallest peak: base is max(0, 1)
        assert!((prominence(&v, 3) - 4.0).abs() < 1e-12);

        let peaks = find_peaks(
            &v,
            &PeakCriteria {
                prominence: Some(2.0),
                ..PeakCriteria::default()
            },
        );
        assert_eq!(peaks, vec![3]);
    }
}
