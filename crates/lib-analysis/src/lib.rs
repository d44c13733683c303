//! # lib-analysis
//!
//! Impulse-response analysis for AMI model output:
//!
//! - **Cursor extraction**: locate the main tap and its UI-spaced pre/post
//!   cursors in a shaped impulse response
//! - **Frequency response**: real-input FFT magnitude in dB
//!
//! Every function here is pure and deterministic; no state is shared
//! between calls.

pub mod cursors;
pub mod error;
pub mod spectrum;

pub use cursors::{find_cursors, CursorSet};
pub use error::{AnalysisError, AnalysisResult};
pub use spectrum::{frequency_response, Spectrum};
