//! Time-domain waveform representation.
//!
//! Impulse responses flowing in and out of an algorithmic model are
//! uniformly-sampled real sequences starting at t = 0. `samples[i]` is a
//! point measurement at `i * dt`.

use crate::units::Seconds;
use serde::{Deserialize, Serialize};

/// A uniformly-sampled time-domain waveform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
    /// Sample values (voltage or normalized units).
    pub samples: Vec<f64>,

    /// Time step between consecutive samples.
    pub dt: Seconds,
}

impl Waveform {
    /// Create a new waveform from samples.
    pub fn new(samples: Vec<f64>, dt: Seconds) -> Self {
        Self { samples, dt }
    }

    /// Number of samples in the waveform.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the waveform is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total duration of the waveform.
    #[inline]
    pub fn duration(&self) -> Seconds {
        Seconds(self.samples.len() as f64 * self.dt.0)
    }

    /// Get the time value for a given sample index.
    #[inline]
    pub fn time_at(&self, index: usize) -> Seconds {
        Seconds(index as f64 * self.dt.0)
    }

    /// Maximum absolute value.
    pub fn max_abs(&self) -> f64 {
        self.samples.iter().map(|v| v.abs()).fold(0.0, f64::max)
    }

    /// Peak-to-peak amplitude.
    pub fn peak_to_peak(&self) -> f64 {
        let (min, max) = self
            .samples
            .iter()
            .fold((f64::MAX, f64::MIN), |(min, max), &v| (min.min(v), max.max(v)));
        max - min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_basics() {
        let samples = vec![0.0, 0.5, 1.0, 0.5, 0.0];
        let wf = Waveform::new(samples, Seconds::from_ps(10.0));

        assert_eq!(wf.len(), 5);
        assert!((wf.duration().as_ps() - 50.0).abs() < 0.01);
        assert!((wf.peak_to_peak() - 1.0).abs() < 0.001);
        assert!((wf.time_at(3).as_ps() - 30.0).abs() < 0.01);
    }

    #[test]
    fn test_max_abs_tracks_negative_peaks() {
        let wf = Waveform::new(vec![0.1, -0.8, 0.3], Seconds::from_ps(1.0));
        assert!((wf.max_abs() - 0.8).abs() < 1e-12);
    }
}
