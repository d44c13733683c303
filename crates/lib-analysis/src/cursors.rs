//! Cursor and tap extraction from a shaped impulse response.
//!
//! A multi-tap transmitter distributes signal energy across UI-spaced taps:
//! the main cursor carries the bulk, and pre/post cursors hold the
//! de-emphasis contributions. Locating them means finding the peak and
//! reading the samples one and two unit intervals away.

use crate::error::{AnalysisError, AnalysisResult};
use serde::Serialize;

/// UI-spaced tap amplitudes around the main cursor of an impulse response.
///
/// A cursor whose index falls outside the response is reported as 0.0; a
/// response whose peak sits at sample 0 legitimately has no pre-cursor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CursorSet {
    /// Sample index of the main tap.
    pub main_index: usize,

    /// Amplitude at the main tap.
    pub main: f64,

    /// Amplitude one UI before the main tap.
    pub pre: f64,

    /// Amplitude one UI after the main tap.
    pub post1: f64,

    /// Amplitude two UI after the main tap.
    pub post2: f64,
}

/// Locate the main cursor and its neighbors.
///
/// The main tap is the sample with the largest absolute amplitude; ties go
/// to the earliest index.
pub fn find_cursors(samples: &[f64], samples_per_ui: usize) -> AnalysisResult<CursorSet> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }
    if samples_per_ui == 0 {
        return Err(AnalysisError::InvalidSamplesPerUi);
    }

    let mut main_index = 0;
    let mut main_abs = samples[0].abs();
    for (i, &v) in samples.iter().enumerate().skip(1) {
        if v.abs() > main_abs {
            main_index = i;
            main_abs = v.abs();
        }
    }

    let at = |index: Option<usize>| -> f64 {
        index
            .and_then(|i| samples.get(i))
            .copied()
            .unwrap_or(0.0)
    };

    Ok(CursorSet {
        main_index,
        main: samples[main_index],
        pre: at(main_index.checked_sub(samples_per_ui)),
        post1: at(main_index.checked_add(samples_per_ui)),
        post2: at(main_index.checked_add(2 * samples_per_ui)),
    })
}
