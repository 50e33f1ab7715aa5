//! Synthetic Gaze Trace Generator
//!
//! Writes a CSV recording in either input layout with a known oscillation,
//! for exercising the analyzer end to end:
//! - Jerk nystagmus (slow linear drift, fast corrective return)
//! - Pendular nystagmus (sinusoid)
//!
//! The simulated predictor follows the actual trace with a fixed frame lag
//! plus Gaussian noise.
//!
//! # Usage
//! ```bash
//! ./simulate-trace --waveform jerk --frequency 4 --seconds 10 -o jerk.csv
//! ./nystagmus-analyzer jerk.csv
//! ```

use std::f64::consts::PI;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::prelude::*;
use rand_distr::{Distribution, Normal};

// ============================================================================
// Screen Constants
// ============================================================================

/// Horizontal screen centre (px)
const CENTER_X: f64 = 960.0;
/// Vertical screen centre (px)
const CENTER_Y: f64 = 540.0;
/// Share of each jerk cycle spent in the slow phase
const JERK_SLOW_FRACTION: f64 = 0.8;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Waveform {
    Jerk,
    Pendular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Layout {
    /// GazeX, GazeY, pGazeX, pGazeY
    Planar,
    /// frameId, actualX, predictedX, predictionErrorX, errorMagnitude
    Horizontal,
}

#[derive(Parser, Debug)]
#[command(name = "simulate-trace")]
#[command(about = "Synthetic nystagmus gaze recordings for analyzer testing")]
#[command(version)]
struct Args {
    /// Oscillation shape
    #[arg(short, long, value_enum, default_value = "pendular")]
    waveform: Waveform,

    /// Output column layout
    #[arg(short, long, value_enum, default_value = "horizontal")]
    layout: Layout,

    /// Oscillation frequency (Hz)
    #[arg(short, long, default_value = "3.0")]
    frequency: f64,

    /// Half peak-to-peak amplitude (px)
    #[arg(short, long, default_value = "40.0")]
    amplitude: f64,

    /// Vertical amplitude as a share of the horizontal one (planar only)
    #[arg(long, default_value = "0.3")]
    vertical_ratio: f64,

    /// Recording length (s)
    #[arg(short, long, default_value = "10.0")]
    seconds: f64,

    /// Frame rate (Hz)
    #[arg(long, default_value = "60.0")]
    fps: f64,

    /// Predictor lag (frames)
    #[arg(long, default_value = "2")]
    lag: usize,

    /// Measurement noise std on the actual trace (px)
    #[arg(long, default_value = "0.5")]
    gaze_noise: f64,

    /// Predictor noise std (px)
    #[arg(long, default_value = "3.0")]
    predictor_noise: f64,

    /// Share of frames written as tracking loss (zero gaze)
    #[arg(long, default_value = "0.0")]
    dropout: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

// ============================================================================
// Signal Generation
// ============================================================================

/// Noise-free offset from centre at time `t`, in units of amplitude.
fn waveform_at(waveform: Waveform, frequency: f64, t: f64) -> f64 {
    match waveform {
        Waveform::Pendular => (2.0 * PI * frequency * t).sin(),
        Waveform::Jerk => {
            let phase = (frequency * t).fract();
            if phase < JERK_SLOW_FRACTION {
                -1.0 + 2.0 * phase / JERK_SLOW_FRACTION
            } else {
                1.0 - 2.0 * (phase - JERK_SLOW_FRACTION) / (1.0 - JERK_SLOW_FRACTION)
            }
        }
    }
}

fn normal(std: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, std).map_err(|e| anyhow::anyhow!("Invalid noise std {std}: {e}"))
}

struct Frame {
    actual: (f64, f64),
    predicted: (f64, f64),
    dropped: bool,
}

fn generate(args: &Args, rng: &mut StdRng) -> Result<Vec<Frame>> {
    let n = (args.seconds * args.fps).round() as usize;
    let gaze_noise = normal(args.gaze_noise)?;
    let predictor_noise = normal(args.predictor_noise)?;

    let actual: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let t = i as f64 / args.fps;
            let x = CENTER_X + args.amplitude * waveform_at(args.waveform, args.frequency, t);
            // Vertical component a quarter cycle out of phase
            let y = CENTER_Y
                + args.amplitude
                    * args.vertical_ratio
                    * waveform_at(args.waveform, args.frequency, t + 0.25 / args.frequency);
            (x + gaze_noise.sample(rng), y + gaze_noise.sample(rng))
        })
        .collect();

    let frames = (0..n)
        .map(|i| {
            let (lx, ly) = actual[i.saturating_sub(args.lag)];
            Frame {
                actual: actual[i],
                predicted: (
                    lx + predictor_noise.sample(rng),
                    ly + predictor_noise.sample(rng),
                ),
                dropped: rng.gen::<f64>() < args.dropout,
            }
        })
        .collect();
    Ok(frames)
}

fn write_csv<W: Write>(out: &mut W, layout: Layout, frames: &[Frame]) -> io::Result<()> {
    match layout {
        Layout::Planar => writeln!(out, "frameId,GazeX,GazeY,pGazeX,pGazeY")?,
        Layout::Horizontal => {
            writeln!(out, "frameId,actualX,predictedX,predictionErrorX,errorMagnitude")?
        }
    }

    for (i, f) in frames.iter().enumerate() {
        let (ax, ay) = if f.dropped { (0.0, 0.0) } else { f.actual };
        let (px, py) = f.predicted;
        match layout {
            Layout::Planar => writeln!(out, "{i},{ax:.3},{ay:.3},{px:.3},{py:.3}")?,
            Layout::Horizontal => {
                let err = ax - px;
                writeln!(out, "{i},{ax:.3},{px:.3},{err:.3},{:.3}", err.abs())?
            }
        }
    }
    out.flush()
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    if args.fps <= 0.0 || args.seconds <= 0.0 || args.frequency <= 0.0 {
        return Err(anyhow::anyhow!(
            "fps, seconds and frequency must all be positive"
        ));
    }

    let mut rng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let frames = generate(&args, &mut rng)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_csv(&mut BufWriter::new(file), args.layout, &frames)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Wrote {} frames ({:?}, {:.2} Hz) to {}",
                frames.len(),
                args.waveform,
                args.frequency,
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            write_csv(&mut stdout.lock(), args.layout, &frames).context("Failed to write stdout")?;
        }
    }
    Ok(())
}
