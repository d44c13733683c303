//! # lib-model
//!
//! Safe FFI wrappers for IBIS-AMI vendor binaries.
//!
//! This crate provides a safe Rust interface for loading and initializing
//! vendor-supplied AMI models (`.dll`/`.so` files). It handles:
//!
//! - Dynamic library loading with `libloading`
//! - Assembly and validation of the initialization record
//! - The `AMI_Init`/`AMI_Close` lifecycle, including repeat initialization
//! - Ownership of every buffer the model reads or writes during a call
//!
//! # Safety
//!
//! Vendor binaries are untrusted native code. The wrapper keeps the harness
//! memory-safe on the Rust side: buffers passed to the model stay alive and
//! unmoved for the duration of the call, and strings the model returns are
//! copied out immediately. What happens inside the model is outside this
//! crate's control. A model that dereferences wild pointers, hangs, or
//! crashes takes the process with it; run untrusted models in a separate
//! process if that matters.

pub mod error;
pub mod init;
pub mod loader;
pub mod session;

pub use error::{AmiError, AmiResult};
pub use init::InitContext;
pub use loader::AmiLibrary;
pub use session::{AmiModel, InitOutput, ModelSession};
