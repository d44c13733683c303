//! AMI model session lifecycle.
//!
//! A session pairs a loaded library with the opaque state pointer returned
//! by `AMI_Init`, and guarantees the teardown contract: `AMI_Close` runs
//! exactly once per live handle, on every exit path, before the library can
//! be unloaded.
//!
//! # Thread safety
//!
//! AMI models may keep mutable internal state keyed to the last
//! initialization, so a session must never be shared between threads. The
//! raw state pointer keeps `ModelSession` `!Send` and `!Sync`; parallel
//! sweeps create one session per worker from the shared `AmiLibrary`.
//!
//! # Blocking
//!
//! The foreign call is a plain blocking call with no timeout, cancellation,
//! or unwind barrier. A model that hangs, hangs its caller; a model that
//! faults at the native level is beyond in-process recovery.

use crate::error::{AmiError, AmiResult};
use crate::init::InitContext;
use crate::loader::AmiLibrary;
use lib_types::params::ParamTree;
use lib_types::waveform::Waveform;
use std::ffi::{c_char, c_void, CStr};
use std::os::raw::c_long;
use std::ptr;
use std::sync::Arc;

/// Everything a successful initialization hands back to the caller.
#[derive(Clone, Debug)]
pub struct InitOutput {
    /// The model-shaped impulse response, copied out of the working buffer.
    pub impulse: Waveform,

    /// The model's returned parameter tree, if it produced one.
    pub params_out: Option<ParamTree>,

    /// The model's status/info message, if it produced one.
    pub message: Option<String>,
}

/// The one capability an AMI model exposes to the rest of the harness.
///
/// Different vendor binaries are interchangeable implementations of this
/// trait; so are in-process fakes used by tests.
pub trait AmiModel {
    /// Run the model's initialization against a prepared context.
    fn initialize(&mut self, ctx: &InitContext) -> AmiResult<InitOutput>;

    /// Release model state. Must be idempotent.
    fn close(&mut self) -> AmiResult<()>;
}

/// An active AMI model session.
pub struct ModelSession {
    /// The loaded library.
    library: Arc<AmiLibrary>,

    /// Opaque handle from AMI_Init; null when no state is live.
    handle: *mut c_void,
}

impl ModelSession {
    /// Create a new session with no live model state.
    pub fn new(library: Arc<AmiLibrary>) -> Self {
        Self {
            library,
            handle: ptr::null_mut(),
        }
    }

    /// Whether the session currently holds live model state.
    pub fn is_initialized(&self) -> bool {
        !self.handle.is_null()
    }
}

impl AmiModel for ModelSession {
    /// Initialize the model.
    ///
    /// The channel response is copied into a working buffer the model
    /// overwrites in place; the context itself is never mutated, so calling
    /// again with the same or a new context is always valid. On repeat
    /// initialization the previous model state is closed first.
    fn initialize(&mut self, ctx: &InitContext) -> AmiResult<InitOutput> {
        // Retire prior state before the model allocates new state.
        self.close()?;

        let mut impulse = ctx.channel().to_vec();
        let mut params_out: *mut c_char = ptr::null_mut();
        let mut handle: *mut c_void = ptr::null_mut();
        let mut msg: *mut c_char = ptr::null_mut();

        let init_fn = self.library.init_fn();
        let return_code = unsafe {
            init_fn(
                impulse.as_mut_ptr(),
                impulse.len() as c_long,
                ctx.aggressors() as c_long,
                ctx.sample_interval().0,
                ctx.bit_time().0,
                ctx.params_text().as_ptr(),
                &mut params_out,
                &mut handle,
                &mut msg,
            )
        } as i64;

        // Read each returned C string exactly once, immediately. The vendor
        // may reuse its scratch memory on the next call into the library.
        let message = unsafe { read_c_string(msg) };
        let params_out_text = unsafe { read_c_string(params_out) };

        if return_code != 0 {
            // Some vendors hand back a handle even on failure; it still has
            // to be released before the error propagates.
            if !handle.is_null() {
                tracing::debug!("Cleaning up handle after init failure");
                let close_fn = self.library.close_fn();
                let _ = unsafe { close_fn(handle) };
            }
            return Err(AmiError::init_failed(
                return_code,
                message.unwrap_or_default(),
            ));
        }

        // Adopt the handle before parsing anything else, so teardown happens
        // even if the returned parameter text is garbage.
        self.handle = handle;

        let params_out = match params_out_text {
            Some(text) => Some(lib_ptree::decode(&text)?),
            None => None,
        };

        tracing::debug!(
            return_code,
            row_size = impulse.len(),
            has_message = message.is_some(),
            has_params_out = params_out.is_some(),
            "AMI_Init completed"
        );

        Ok(InitOutput {
            impulse: Waveform::new(impulse, ctx.sample_interval()),
            params_out,
            message,
        })
    }

    /// Close the session and release model state.
    ///
    /// Calling close on a session with no live state is a no-op; the
    /// teardown entry point is never invoked twice for one handle.
    fn close(&mut self) -> AmiResult<()> {
        if self.handle.is_null() {
            return Ok(());
        }

        let close_fn = self.library.close_fn();
        let handle = std::mem::replace(&mut self.handle, ptr::null_mut());
        let return_code = unsafe { close_fn(handle) } as i64;

        if return_code != 0 {
            return Err(AmiError::CloseFailed { code: return_code });
        }

        tracing::debug!("AMI_Close completed");
        Ok(())
    }
}

impl Drop for ModelSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "Error during session cleanup");
        }
    }
}

/// Read a C string, returning None if null or invalid UTF-8.
///
/// # Safety
/// The pointer must be null or point to a valid null-terminated C string.
unsafe fn read_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: Caller guarantees ptr is valid if not null
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(String::from) }
}
