//! Error types for the parameter-tree codec.

use thiserror::Error;

/// Errors raised while serializing a parameter tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A parameter name cannot be represented in the grammar.
    #[error("invalid parameter name {0:?}: names must be non-empty and free of whitespace, parentheses, quotes, and NUL")]
    InvalidName(String),

    /// A string value contains delimiter characters the grammar cannot escape.
    #[error("string value {0:?} contains characters the parameter grammar cannot represent")]
    UnencodableString(String),
}

/// Errors raised while parsing parameter-tree text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input is empty or whitespace-only.
    #[error("empty parameter text")]
    Empty,

    /// Parentheses do not balance.
    #[error("unbalanced parentheses in parameter text")]
    Unbalanced,

    /// A string literal never closes.
    #[error("unterminated string literal in parameter text")]
    UnterminatedString,

    /// Leftover input after a complete tree.
    #[error("trailing input after parameter tree: {0:?}")]
    TrailingInput(String),

    /// The top-level form is not a named subtree.
    #[error("the root of a parameter tree must be a named subtree")]
    RootNotTree,

    /// Any other structural violation.
    #[error("malformed parameter text: {0}")]
    Malformed(String),
}
