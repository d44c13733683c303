//! Error types for analysis operations.

use thiserror::Error;

/// Errors that can occur during impulse-response analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The impulse response has no samples.
    #[error("Impulse response is empty")]
    EmptyResponse,

    /// Samples per UI must be at least one.
    #[error("samples_per_ui must be > 0")]
    InvalidSamplesPerUi,

    /// FFT size is not a power of 2.
    #[error("FFT size must be power of 2, got {0}")]
    InvalidFftSize(usize),

    /// Sample interval must be positive.
    #[error("Sample interval must be positive, got {0}")]
    InvalidSampleInterval(f64),

    /// Numerical instability detected.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
