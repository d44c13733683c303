//! Assembly of the AMI_Init argument record.
//!
//! An `InitContext` captures everything one initialization call needs: the
//! channel impulse response, timing, aggressor count, and the parameter tree
//! in both structured and serialized form. It is validated and serialized at
//! construction, then never mutated, so a single context can drive repeat
//! initializations.

use crate::error::{AmiError, AmiResult};
use lib_types::params::ParamTree;
use lib_types::units::Seconds;
use std::ffi::CString;

/// Immutable per-call initialization record.
#[derive(Clone, Debug)]
pub struct InitContext {
    params: ParamTree,
    params_text: CString,
    channel: Vec<f64>,
    sample_interval: Seconds,
    bit_time: Seconds,
    aggressors: usize,
}

impl InitContext {
    /// Build and validate an initialization record.
    ///
    /// The parameter tree is serialized here so codec failures surface
    /// before any foreign call is attempted. Pure construction, no I/O.
    pub fn build(
        params: ParamTree,
        channel: Vec<f64>,
        sample_interval: Seconds,
        bit_time: Seconds,
        aggressors: usize,
    ) -> AmiResult<Self> {
        if channel.is_empty() {
            return Err(AmiError::invalid_init(
                "channel_response",
                "must contain at least one sample",
            ));
        }
        // The negated comparison also rejects NaN.
        if !(sample_interval.0 > 0.0) {
            return Err(AmiError::invalid_init(
                "sample_interval",
                "must be positive",
            ));
        }
        if !(bit_time.0 >= sample_interval.0) {
            return Err(AmiError::invalid_init(
                "bit_time",
                "must be at least one sample interval",
            ));
        }

        let text = lib_ptree::encode(&params)?;
        let params_text = CString::new(text)
            .map_err(|_| AmiError::invalid_init("parameters", "contains NUL byte"))?;

        Ok(Self {
            params,
            params_text,
            channel,
            sample_interval,
            bit_time,
            aggressors,
        })
    }

    /// The structured parameter tree.
    pub fn params(&self) -> &ParamTree {
        &self.params
    }

    /// The serialized parameter tree, ready to cross the FFI boundary.
    pub fn params_text(&self) -> &CString {
        &self.params_text
    }

    /// The channel impulse response samples.
    pub fn channel(&self) -> &[f64] {
        &self.channel
    }

    /// Number of rows in the impulse matrix.
    pub fn row_size(&self) -> usize {
        self.channel.len()
    }

    /// Sample interval.
    pub fn sample_interval(&self) -> Seconds {
        self.sample_interval
    }

    /// Unit interval (bit time).
    pub fn bit_time(&self) -> Seconds {
        self.bit_time
    }

    /// Number of interfering aggressor channels.
    pub fn aggressors(&self) -> usize {
        self.aggressors
    }

    /// Samples per unit interval, rounded to the nearest integer.
    pub fn samples_per_ui(&self) -> usize {
        (self.bit_time.0 / self.sample_interval.0).round() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::params::ParamNode;

    fn demo_params() -> ParamTree {
        let mut tree = ParamTree::new("example_tx");
        tree.params.set("tx_tap_units", ParamNode::leaf(27));
        tree
    }

    fn ui() -> Seconds {
        Seconds(1.0 / 10e9)
    }

    fn dt() -> Seconds {
        Seconds(ui().0 / 32.0)
    }

    #[test]
    fn test_build_valid_context() {
        let ctx =
            InitContext::build(demo_params(), vec![0.0; 6400], dt(), ui(), 0).unwrap();

        assert_eq!(ctx.row_size(), 6400);
        assert_eq!(ctx.samples_per_ui(), 32);
        assert_eq!(ctx.aggressors(), 0);
        assert_eq!(
            ctx.params_text().to_str().unwrap(),
            "(example_tx (tx_tap_units 27))"
        );
    }

    #[test]
    fn test_empty_channel_rejected() {
        let err = InitContext::build(demo_params(), vec![], dt(), ui(), 0).unwrap_err();
        assert!(matches!(
            err,
            AmiError::InvalidInit { ref name, .. } if name == "channel_response"
        ));
    }

    #[test]
    fn test_nonpositive_sample_interval_rejected() {
        for bad in [0.0, -1e-12, f64::NAN] {
            let err = InitContext::build(
                demo_params(),
                vec![1.0],
                Seconds(bad),
                ui(),
                0,
            )
            .unwrap_err();
            assert!(matches!(
                err,
                AmiError::InvalidInit { ref name, .. } if name == "sample_interval"
            ));
        }
    }

    #[test]
    fn test_bit_time_below_sample_interval_rejected() {
        let err =
            InitContext::build(demo_params(), vec![1.0], dt(), Seconds(dt().0 / 2.0), 0)
                .unwrap_err();
        assert!(matches!(
            err,
            AmiError::InvalidInit { ref name, .. } if name == "bit_time"
        ));
    }

    #[test]
    fn test_bit_time_equal_to_sample_interval_allowed() {
        let ctx = InitContext::build(demo_params(), vec![1.0], dt(), dt(), 0).unwrap();
        assert_eq!(ctx.samples_per_ui(), 1);
    }

    #[test]
    fn test_codec_failure_surfaces_at_build() {
        let mut tree = ParamTree::new("m");
        tree.params.set("bad", ParamNode::leaf("a(b"));
        let err = InitContext::build(tree, vec![1.0], dt(), ui(), 0).unwrap_err();
        assert!(matches!(err, AmiError::Encode(_)));
    }
}
