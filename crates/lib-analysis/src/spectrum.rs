//! Frequency-domain magnitude response via real-input FFT.

use crate::error::{AnalysisError, AnalysisResult};
use lib_types::units::Seconds;
use num_complex::Complex64;
use realfft::{RealFftPlanner, RealToComplex};
use serde::Serialize;

/// Floor added to magnitudes before the logarithm so exact zeros stay
/// finite in dB.
pub const LOG_EPSILON: f64 = 1e-12;

/// One-sided magnitude spectrum in decibels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Spectrum {
    /// Frequency axis in Hz, from DC to Nyquist.
    pub frequencies: Vec<f64>,

    /// Magnitude in dB at each frequency.
    pub magnitude_db: Vec<f64>,
}

impl Spectrum {
    /// Number of frequency points.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Check whether the spectrum has no points.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Compute the one-sided magnitude response of an impulse response.
///
/// The input is truncated or zero-padded to `transform_len` (a power of
/// two), transformed with a real-input FFT, and reported as
/// `20*log10(|H| + epsilon)`. Frequencies run from DC to Nyquist, spaced at
/// `1 / (transform_len * sample_interval)`.
pub fn frequency_response(
    samples: &[f64],
    sample_interval: Seconds,
    transform_len: usize,
) -> AnalysisResult<Spectrum> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }
    if !(sample_interval.0 > 0.0) {
        return Err(AnalysisError::InvalidSampleInterval(sample_interval.0));
    }
    if transform_len == 0 || !transform_len.is_power_of_two() {
        return Err(AnalysisError::InvalidFftSize(transform_len));
    }

    // resize both zero-pads short inputs and truncates long ones
    let mut input = samples.to_vec();
    input.resize(transform_len, 0.0);

    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(transform_len);
    let mut output: Vec<Complex64> = r2c.make_output_vec();

    r2c.process(&mut input, &mut output)
        .map_err(|e| AnalysisError::NumericalInstability(e.to_string()))?;

    let df = 1.0 / (transform_len as f64 * sample_interval.0);
    let frequencies = (0..output.len()).map(|k| k as f64 * df).collect();
    let magnitude_db = output
        .iter()
        .map(|c| 20.0 * (c.norm() + LOG_EPSILON).log10())
        .collect();

    Ok(Spectrum {
        frequencies,
        magnitude_db,
    })
}
