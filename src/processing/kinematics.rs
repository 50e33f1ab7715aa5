//! Position smoothing and finite-difference kinematics.

use serde::{Deserialize, Serialize};

use crate::config::SmoothingConfig;

// ============================================================================
// Savitzky-Golay Smoothing
// ============================================================================

/// Savitzky-Golay smoothing with polynomial edge fitting.
///
/// The window is capped at the trace length and forced odd. The filter is
/// only applied when the trace is strictly longer than the window and the
/// polynomial order is below the window; otherwise the trace is returned
/// unchanged. Edge samples are evaluated on the polynomial fitted to the
/// first / last full window.
pub fn savgol_smooth(trace: &[f64], window: usize, polyorder: usize) -> Vec<f64> {
    let n = trace.len();
    let mut window = window.min(n);
    if window % 2 == 0 {
        window = window.saturating_sub(1);
    }
    if n <= window || polyorder >= window {
        return trace.to_vec();
    }

    let half = window / 2;
    let mut smoothed = Vec::with_capacity(n);
    for i in 0..n {
        let start = i.saturating_sub(half).min(n - window);
        let segment = &trace[start..start + window];
        let at = i as f64 - (start + half) as f64;
        smoothed.push(fit_and_evaluate(segment, polyorder, at));
    }
    smoothed
}

/// Least-squares polynomial fit of `segment` (abscissae centered on the
/// window middle) evaluated at offset `at`.
fn fit_and_evaluate(segment: &[f64], order: usize, at: f64) -> f64 {
    let half = (segment.len() / 2) as f64;
    let terms = order + 1;

    // Normal equations: (A^T A) c = A^T y
    let mut ata = vec![vec![0.0; terms]; terms];
    let mut aty = vec![0.0; terms];
    for (j, &y) in segment.iter().enumerate() {
        let x = j as f64 - half;
        let powers: Vec<f64> = (0..terms).map(|p| x.powi(p as i32)).collect();
        for r in 0..terms {
            aty[r] += powers[r] * y;
            for c in 0..terms {
                ata[r][c] += powers[r] * powers[c];
            }
        }
    }

    match solve_linear(ata, aty) {
        Some(coeffs) => coeffs
            .iter()
            .enumerate()
            .map(|(p, c)| c * at.powi(p as i32))
            .sum(),
        // Singular system cannot happen for order < window; keep the sample
        None => segment[(at + half) as usize],
    }
}

/// Gaussian elimination with partial pivoting.
fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

// ============================================================================
// Finite Differences
// ============================================================================

/// Central-difference gradient with one-sided first-order edges.
///
/// Output length equals input length; a single sample has gradient 0.
pub fn gradient(values: &[f64], dt: f64) -> Vec<f64> {
    let n = values.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n)
            .map(|i| {
                if i == 0 {
                    (values[1] - values[0]) / dt
                } else if i == n - 1 {
                    (values[n - 1] - values[n - 2]) / dt
                } else {
                    (values[i + 1] - values[i - 1]) / (2.0 * dt)
                }
            })
            .collect(),
    }
}

/// Signed velocity (px/s).
pub fn velocity(trace: &[f64], dt: f64) -> Vec<f64> {
    gradient(trace, dt)
}

/// Signed acceleration (px/s^2), the gradient of velocity.
pub fn acceleration(trace: &[f64], dt: f64) -> Vec<f64> {
    gradient(&velocity(trace, dt), dt)
}

/// Speed of a single-axis trace.
pub fn speed(trace: &[f64], dt: f64) -> Vec<f64> {
    velocity(trace, dt).iter().map(|v| v.abs()).collect()
}

/// Euclidean speed of a two-axis trace.
pub fn planar_speed(x: &[f64], y: &[f64], dt: f64) -> Vec<f64> {
    velocity(x, dt)
        .iter()
        .zip(velocity(y, dt).iter())
        .map(|(vx, vy)| vx.hypot(*vy))
        .collect()
}

// ============================================================================
// Derived Kinematics
// ============================================================================

/// Smoothed position plus velocity / acceleration series for one axis.
///
/// All series have the same length as the source trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedKinematics {
    pub smoothed: Vec<f64>,
    /// Signed velocity (px/s)
    pub velocity: Vec<f64>,
    /// Signed acceleration (px/s^2)
    pub acceleration: Vec<f64>,
    /// |velocity|
    pub speed: Vec<f64>,
    /// |acceleration|
    pub acceleration_magnitude: Vec<f64>,
}

impl DerivedKinematics {
    /// Differentiate either the smoothed or the raw trace.
    pub fn compute(trace: &[f64], fps: f64, smoothing: &SmoothingConfig, from_smoothed: bool) -> Self {
        let dt = 1.0 / fps;
        let smoothed = savgol_smooth(trace, smoothing.window, smoothing.polyorder);
        let source = if from_smoothed { &smoothed } else { trace };

        let velocity = gradient(source, dt);
        let acceleration = gradient(&velocity, dt);
        let speed = velocity.iter().map(|v| v.abs()).collect();
        let acceleration_magnitude = acceleration.iter().map(|a| a.abs()).collect();

        tracing::trace!(samples = trace.len(), from_smoothed, "Derived kinematics");

        Self {
            smoothed,
            velocity,
            acceleration,
            speed,
            acceleration_magnitude,
        }
    }

    pub fn len(&self) -> usize {
        self.velocity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.velocity.is_empty()
    }
}
