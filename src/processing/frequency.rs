//! Dominant frequency, harmonics, band energy and stability of a gaze trace.

use crate::config::FrequencyPreset;
use crate::types::{
    BandEnergy, FrequencyCategory, FrequencyResult, Harmonic, SpectralPeak,
};

use super::fft::{compute_spectrum, find_peaks, FrequencySpectrum, PeakCriteria};
use super::stats;

// ============================================================================
// Frequency Analyzer
// ============================================================================

/// Spectral analysis of a position trace under one frequency preset.
pub struct FrequencyAnalyzer<'a> {
    preset: &'a FrequencyPreset,
    fps: f64,
    stability_window_secs: f64,
    min_stability_window: usize,
}

impl<'a> FrequencyAnalyzer<'a> {
    pub fn new(
        preset: &'a FrequencyPreset,
        fps: f64,
        stability_window_secs: f64,
        min_stability_window: usize,
    ) -> Self {
        Self {
            preset,
            fps,
            stability_window_secs,
            min_stability_window,
        }
    }

    /// Characterize a (smoothed) position trace.
    ///
    /// A missing peak is a valid outcome: the result then reports no
    /// dominant frequency and the "no distinct frequency" category.
    pub fn analyze(&self, trace: &[f64]) -> FrequencyResult {
        let spectrum = match compute_spectrum(trace, self.fps, true) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(error = %e, "Spectrum unavailable");
                return FrequencyResult::empty(0.0);
            }
        };

        let peaks = self.band_peaks(&spectrum);
        let power = spectrum.power();

        let dominant_idx = peaks.iter().copied().max_by(|&a, &b| {
            spectrum.magnitudes[a]
                .partial_cmp(&spectrum.magnitudes[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let dominant = dominant_idx.map(|i| SpectralPeak {
            frequency: spectrum.frequencies[i],
            power: power[i],
        });

        let (harmonics, secondary) = match (dominant, dominant_idx) {
            (Some(main), Some(main_idx)) => (
                self.harmonics(&spectrum, &power, main),
                self.secondary_peaks(&spectrum, &power, &peaks, main_idx),
            ),
            _ => (Vec::new(), Vec::new()),
        };

        let bands = self.band_energy(&spectrum, &power);
        let dominant_band = bands
            .iter()
            .filter(|b| b.share_percent > 0.0)
            .max_by(|a, b| {
                a.share_percent
                    .partial_cmp(&b.share_percent)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|b| b.name.clone());

        let stability = self.stability(trace);

        tracing::debug!(
            dominant_hz = dominant.map_or(0.0, |p| p.frequency),
            peaks = peaks.len(),
            harmonics = harmonics.len(),
            stability = stability,
            resolution_hz = spectrum.resolution,
            "Frequency analysis complete"
        );

        FrequencyResult {
            dominant,
            category: FrequencyCategory::from_frequency(dominant.map(|p| p.frequency)),
            stability,
            harmonics,
            secondary,
            bands,
            dominant_band,
            resolution_hz: spectrum.resolution,
        }
    }

    /// Dominant in-band peak only, for per-axis summaries.
    pub fn dominant_peak(&self, trace: &[f64]) -> Option<SpectralPeak> {
        let spectrum = compute_spectrum(trace, self.fps, true).ok()?;
        self.band_peaks(&spectrum)
            .into_iter()
            .max_by(|&a, &b| {
                spectrum.magnitudes[a]
                    .partial_cmp(&spectrum.magnitudes[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|i| SpectralPeak {
                frequency: spectrum.frequencies[i],
                power: spectrum.magnitudes[i] * spectrum.magnitudes[i],
            })
    }

    /// Local maxima of the whole positive spectrum that fall inside the band
    /// and pass the prominence / separation filters.
    ///
    /// Thresholds are relative to the largest in-band magnitude; maxima are
    /// found on the full spectrum so band-edge bins still have neighbours.
    fn band_peaks(&self, spectrum: &FrequencySpectrum) -> Vec<usize> {
        let band = spectrum.band_indices(self.preset.band_low_hz, self.preset.band_high_hz);
        let band_max = band
            .iter()
            .map(|&i| spectrum.magnitudes[i])
            .fold(0.0_f64, f64::max);
        if band.is_empty() || band_max <= 0.0 {
            return Vec::new();
        }

        let distance = (self.preset.min_peak_separation_hz / spectrum.resolution).ceil() as usize;
        let criteria = PeakCriteria {
            height: None,
            distance: Some(distance.max(1)),
            prominence: Some(self.preset.prominence_fraction * band_max),
        };

        find_peaks(&spectrum.magnitudes, &criteria)
            .into_iter()
            .filter(|&i| self.preset.in_band(spectrum.frequencies[i]))
            .collect()
    }

    fn harmonics(&self, spectrum: &FrequencySpectrum, power: &[f64], main: SpectralPeak) -> Vec<Harmonic> {
        let tol = self.preset.harmonic_tolerance_hz;
        let mut harmonics = Vec::new();

        for order in 2..=self.preset.max_harmonic {
            let target = main.frequency * order as f64;
            if target > self.preset.band_high_hz {
                break;
            }

            let best = spectrum
                .frequencies
                .iter()
                .zip(power.iter())
                .filter(|(&f, _)| (f - target).abs() < tol && self.preset.in_band(f))
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            // Reported at the exact multiple, not the matched bin
            if let Some((_, &p)) = best {
                if p > self.preset.harmonic_power_ratio * main.power {
                    harmonics.push(Harmonic {
                        order,
                        frequency: target,
                        power: p,
                    });
                }
            }
        }
        harmonics
    }

    fn secondary_peaks(
        &self,
        spectrum: &FrequencySpectrum,
        power: &[f64],
        peaks: &[usize],
        main_idx: usize,
    ) -> Vec<SpectralPeak> {
        let mut others: Vec<usize> = peaks.iter().copied().filter(|&i| i != main_idx).collect();
        others.sort_by(|&a, &b| power[b].partial_cmp(&power[a]).unwrap_or(std::cmp::Ordering::Equal));

        let floor = self.preset.secondary_power_ratio * power[main_idx];
        others
            .into_iter()
            .take(self.preset.max_secondary_peaks)
            .filter(|&i| power[i] > floor)
            .map(|i| SpectralPeak {
                frequency: spectrum.frequencies[i],
                power: power[i],
            })
            .collect()
    }

    /// Share of the in-band power falling in each configured sub-band.
    fn band_energy(&self, spectrum: &FrequencySpectrum, power: &[f64]) -> Vec<BandEnergy> {
        let total: f64 = spectrum
            .frequencies
            .iter()
            .zip(power.iter())
            .filter(|(&f, _)| self.preset.in_band(f))
            .map(|(_, &p)| p)
            .sum();

        self.preset
            .bands
            .iter()
            .map(|band| {
                let band_power: f64 = spectrum
                    .frequencies
                    .iter()
                    .zip(power.iter())
                    .filter(|(&f, _)| f >= band.low_hz && f < band.high_hz && self.preset.in_band(f))
                    .map(|(_, &p)| p)
                    .sum();
                let share_percent = if total > 0.0 {
                    band_power / total * 100.0
                } else {
                    0.0
                };
                BandEnergy {
                    name: band.name.clone(),
                    low_hz: band.low_hz,
                    high_hz: band.high_hz,
                    share_percent,
                }
            })
            .collect()
    }

    /// `1 - std/mean` of the per-window dominant frequency, clamped to [0, 1].
    ///
    /// Windows of `min(stability_window_secs * fps, n / 4)` samples at 50%
    /// overlap; unwindowed spectra. The window ending on the last sample is
    /// not used. Needs two windows with a detected
    /// frequency, otherwise 0.
    pub fn stability(&self, trace: &[f64]) -> f64 {
        let n = trace.len();
        let window = ((self.stability_window_secs * self.fps) as usize).min(n / 4);
        if window < self.min_stability_window {
            return 0.0;
        }
        let step = (window / 2).max(1);

        let mut freqs = Vec::new();
        let mut start = 0;
        while start + window < n {
            let segment = &trace[start..start + window];
            if let Ok(spectrum) = compute_spectrum(segment, self.fps, false) {
                if let Some((f, m)) =
                    spectrum.peak_in_band(self.preset.band_low_hz, self.preset.band_high_hz)
                {
                    if m > 0.0 {
                        freqs.push(f);
                    }
                }
            }
            start += step;
        }

        if freqs.len() < 2 {
            return 0.0;
        }
        let mean = stats::mean(&freqs);
        if mean <= 0.0 {
            return 0.0;
        }
        (1.0 - stats::population_std(&freqs) / mean).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults;
    use std::f64::consts::PI;

    fn analyzer(preset: &FrequencyPreset, fps: f64) -> FrequencyAnalyzer<'_> {
        FrequencyAnalyzer::new(
            preset,
            fps,
            defaults::STABILITY_WINDOW_SECS,
            defaults::MIN_STABILITY_WINDOW,
        )
    }

    fn sine(freq: f64, amp: f64, fps: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| amp * (2.0 * PI * freq * i as f64 / fps).sin())
            .collect()
    }

    #[test]
    fn test_detects_dominant_frequency() {
        let preset = FrequencyPreset::horizontal();
        let trace = sine(4.0, 20.0, 60.0, 600);
        let result = analyzer(&preset, 60.0).analyze(&trace);

        println!("Dominant: {:.2} Hz", result.dominant_frequency());
        assert!((result.dominant_frequency() - 4.0).abs() < 1e-9);
        assert_eq!(result.category, FrequencyCategory::Mid);
        assert!(result.stability > 0.99, "steady tone, got {}", result.stability);
        assert_eq!(result.dominant_band.as_deref(), Some("3-7 Hz"));
    }

    #[test]
    fn test_harmonic_detection() {
        let preset = FrequencyPreset::horizontal();
        let fundamental = sine(2.0, 20.0, 60.0, 600);
        let third = sine(6.0, 10.0, 60.0, 600);
        let trace: Vec<f64> = fundamental.iter().zip(&third).map(|(a, b)| a + b).collect();

        let result = analyzer(&preset, 60.0).analyze(&trace);
        assert!((result.dominant_frequency() - 2.0).abs() < 1e-9);
        assert!(
            result.harmonics.iter().any(|h| h.order == 3 && (h.frequency - 6.0).abs() < 1e-9),
            "3rd harmonic at 25% power should be reported: {:?}",
            result.harmonics
        );
        // 25% of the main power is under the 30% secondary floor
        assert!(
            result.secondary.iter().all(|p| (p.frequency - 6.0).abs() > 1e-9),
            "unexpected secondary peaks: {:?}",
            result.secondary
        );
    }

    #[test]
    fn test_constant_trace_has_no_peak() {
        let preset = FrequencyPreset::planar();
        let result = analyzer(&preset, 60.0).analyze(&[5.0; 120]);
        assert!(result.dominant.is_none());
        assert_eq!(result.category, FrequencyCategory::NoDistinctFrequency);
        assert_eq!(result.stability, 0.0);
        assert!(result.dominant_band.is_none());
    }

    #[test]
    fn test_short_trace_stability_is_zero() {
        let preset = FrequencyPreset::horizontal();
        // n / 4 = 9 < 10 samples
        let trace = sine(5.0, 10.0, 60.0, 36);
        assert_eq!(analyzer(&preset, 60.0).stability(&trace), 0.0);
    }

    #[test]
    fn test_band_shares_sum_to_at_most_100() {
        let preset = FrequencyPreset::horizontal();
        let trace = sine(1.7, 15.0, 60.0, 300);
        let result = analyzer(&preset, 60.0).analyze(&trace);
        let total: f64 = result.bands.iter().map(|b| b.share_percent).sum();
        assert!(total <= 100.0 + 1e-9, "shares sum to {total}");
        assert_eq!(result.dominant_band.as_deref(), Some("1-3 Hz"));
    }

    #[test]
    fn test_band_shares_ignore_out_of_band_power() {
        let preset = FrequencyPreset::horizontal();
        let in_band = sine(4.0, 20.0, 60.0, 600);
        let above = sine(25.0, 20.0, 60.0, 600);
        let trace: Vec<f64> = in_band.iter().zip(&above).map(|(a, b)| a + b).collect();

        let result = analyzer(&preset, 60.0).analyze(&trace);
        let total: f64 = result.bands.iter().map(|b| b.share_percent).sum();
        assert!((total - 100.0).abs() < 0.5, "in-band shares sum to {total}");
        let mid = result
            .bands
            .iter()
            .find(|b| b.name == "3-7 Hz")
            .expect("default bands include 3-7 Hz");
        assert!(mid.share_percent > 99.0, "3-7 Hz share {}", mid.share_percent);
    }

    #[test]
    fn test_harmonic_reported_at_exact_multiple() {
        let preset = FrequencyPreset::horizontal();
        // Strongest bin near 3 x 1.5 Hz sits at 4.6 Hz, inside the 0.5 Hz tolerance
        let fundamental = sine(1.5, 20.0, 60.0, 600);
        let near_third = sine(4.6, 12.0, 60.0, 600);
        let trace: Vec<f64> = fundamental.iter().zip(&near_third).map(|(a, b)| a + b).collect();

        let result = analyzer(&preset, 60.0).analyze(&trace);
        assert!((result.dominant_frequency() - 1.5).abs() < 1e-9);
        let h3 = result
            .harmonics
            .iter()
            .find(|h| h.order == 3)
            .expect("3rd harmonic above the power ratio");
        assert!((h3.frequency - 4.5).abs() < 1e-9, "reported at {} Hz", h3.frequency);
    }

    #[test]
    fn test_stability_skips_trailing_window() {
        let preset = FrequencyPreset::horizontal();
        // 420 samples of 4 Hz, then a louder 10 Hz burst filling only the final window
        let mut trace = sine(4.0, 10.0, 60.0, 420);
        trace.extend(sine(10.0, 40.0, 60.0, 60));
        assert_eq!(trace.len(), 480);

        let stability = analyzer(&preset, 60.0).stability(&trace);
        assert!(
            (stability - 1.0).abs() < 1e-9,
            "windows starting 0..=300 all see 4 Hz, got {stability}"
        );
    }
}
