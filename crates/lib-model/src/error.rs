//! Error types for AMI model operations.

use thiserror::Error;

/// Errors that can occur while loading or invoking an AMI model.
#[derive(Debug, Error)]
pub enum AmiError {
    /// Failed to load the shared library.
    #[error("Failed to load library '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: libloading::Error,
    },

    /// Required symbol not found in library.
    #[error("Symbol '{symbol}' not found in library")]
    SymbolNotFound { symbol: String },

    /// The initialization record violates an invariant.
    #[error("Invalid initialization parameter '{name}': {reason}")]
    InvalidInit { name: String, reason: String },

    /// The input parameter tree cannot be serialized.
    #[error(transparent)]
    Encode(#[from] lib_ptree::EncodeError),

    /// The model's returned parameter text cannot be parsed.
    #[error("Model returned unparseable parameter text: {0}")]
    Decode(#[from] lib_ptree::DecodeError),

    /// AMI_Init returned a failure status.
    #[error("AMI_Init failed with code {code}: {message}")]
    InitFailed { code: i64, message: String },

    /// AMI_Close returned a failure status.
    #[error("AMI_Close failed with code {code}")]
    CloseFailed { code: i64 },
}

impl AmiError {
    /// Create a load error.
    pub fn load(path: impl Into<String>, source: libloading::Error) -> Self {
        Self::Load {
            path: path.into(),
            source,
        }
    }

    /// Create a symbol not found error.
    pub fn symbol_not_found(symbol: impl Into<String>) -> Self {
        Self::SymbolNotFound {
            symbol: symbol.into(),
        }
    }

    /// Create an invalid initialization error.
    pub fn invalid_init(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInit {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an init failed error.
    pub fn init_failed(code: i64, message: impl Into<String>) -> Self {
        Self::InitFailed {
            code,
            message: message.into(),
        }
    }
}

/// Result type for AMI operations.
pub type AmiResult<T> = Result<T, AmiError>;
