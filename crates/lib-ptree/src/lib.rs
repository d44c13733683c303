//! # lib-ptree
//!
//! Text codec for the parenthesized parameter-tree format that IBIS-AMI
//! models consume and produce.
//!
//! The wire form is ASCII, whitespace-delimited, with no comments and no
//! escape sequences: each subtree is wrapped as `(name child...)`, each leaf
//! as `(name value)`, and an empty subtree as `(name)`. String values are
//! double-quoted.
//!
//! `decode(encode(t))` reproduces `t` for every tree that encodes
//! successfully.

pub mod decode;
pub mod encode;
pub mod error;

pub use decode::decode;
pub use encode::encode;
pub use error::{DecodeError, EncodeError};
