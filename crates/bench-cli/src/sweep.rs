//! Sweep orchestration.
//!
//! A sweep exercises one loaded model across an ordered list of parameter
//! configurations: merge the overrides onto the base tree, build a fresh
//! initialization record, invoke the model, analyze the shaped response,
//! and collect the results in submission order. The library is loaded once
//! for the whole sweep; each configuration re-initializes the same session.
//!
//! Configurations run strictly sequentially. The first failure aborts the
//! sweep, with the offending configuration's label attached to the error.

use anyhow::{Context, Result};
use lib_analysis::{find_cursors, frequency_response, CursorSet, Spectrum};
use lib_model::{AmiLibrary, AmiModel, InitContext, ModelSession};
use lib_types::params::{ParamBranch, ParamTree};
use lib_types::units::Seconds;
use lib_types::waveform::Waveform;
use std::path::Path;

/// Everything shared by every configuration in a sweep.
#[derive(Clone, Debug)]
pub struct SweepTemplate {
    /// Base parameter tree; overrides merge onto its children.
    pub params: ParamTree,

    /// Channel impulse response handed to the model.
    pub channel: Vec<f64>,

    /// Sample interval.
    pub sample_interval: Seconds,

    /// Unit interval (bit time).
    pub bit_time: Seconds,

    /// Number of interfering aggressor channels.
    pub aggressors: usize,

    /// FFT length for the frequency response.
    pub fft_points: usize,
}

/// One configuration to run: a label plus parameter overrides.
#[derive(Clone, Debug)]
pub struct SweepConfig {
    /// Label reported with the results.
    pub label: String,

    /// Overrides merged onto the template's parameter tree.
    pub overrides: ParamBranch,
}

/// Results for one configuration.
#[derive(Clone, Debug)]
pub struct SweepResult {
    /// The configuration's label.
    pub label: String,

    /// The model-shaped impulse response.
    pub impulse: Waveform,

    /// Cursor taps extracted from the response.
    pub cursors: CursorSet,

    /// Magnitude response of the shaped impulse.
    pub spectrum: Spectrum,

    /// The model's status/info message, if any.
    pub message: Option<String>,

    /// The model's returned parameter tree, if any.
    pub params_out: Option<ParamTree>,
}

/// Load a model and run every configuration against it.
///
/// The session is closed before returning, on success and on failure.
pub fn run_model_sweep(
    model_path: &Path,
    template: &SweepTemplate,
    configs: &[SweepConfig],
) -> Result<Vec<SweepResult>> {
    let library = AmiLibrary::load(model_path)
        .with_context(|| format!("loading model {:?}", model_path))?;
    let mut session = ModelSession::new(library);

    let results = run_sweep(&mut session, template, configs);

    if let Err(e) = session.close() {
        tracing::warn!(error = %e, "Error closing model session after sweep");
    }

    results
}

/// Run every configuration against an already-loaded model, in order.
pub fn run_sweep<M: AmiModel>(
    model: &mut M,
    template: &SweepTemplate,
    configs: &[SweepConfig],
) -> Result<Vec<SweepResult>> {
    let mut results = Vec::with_capacity(configs.len());

    for config in configs {
        tracing::info!(label = %config.label, "Running configuration");
        let result = run_one(model, template, config)
            .with_context(|| format!("configuration '{}' failed", config.label))?;
        results.push(result);
    }

    Ok(results)
}

fn run_one<M: AmiModel>(
    model: &mut M,
    template: &SweepTemplate,
    config: &SweepConfig,
) -> Result<SweepResult> {
    let params = template.params.merged(&config.overrides);

    let ctx = InitContext::build(
        params,
        template.channel.clone(),
        template.sample_interval,
        template.bit_time,
        template.aggressors,
    )?;
    let samples_per_ui = ctx.samples_per_ui();

    let output = model.initialize(&ctx)?;

    let cursors = find_cursors(&output.impulse.samples, samples_per_ui)?;
    let spectrum = frequency_response(
        &output.impulse.samples,
        template.sample_interval,
        template.fft_points,
    )?;

    tracing::debug!(
        main_index = cursors.main_index,
        main = cursors.main,
        pre = cursors.pre,
        post1 = cursors.post1,
        post2 = cursors.post2,
        "Analysis complete"
    );

    Ok(SweepResult {
        label: config.label.clone(),
        impulse: output.impulse,
        cursors,
        spectrum,
        message: output.message,
        params_out: output.params_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_model::{AmiError, AmiResult, InitOutput};
    use lib_types::params::{ParamNode, ParamValue};

    /// In-process stand-in for a vendor binary: applies a three-tap FIR
    /// shape scaled by the `gain` parameter and tracks lifecycle calls.
    struct FakeModel {
        init_calls: usize,
        teardown_calls: usize,
        live: bool,
        fail_when_gain: Option<i64>,
    }

    impl FakeModel {
        fn new() -> Self {
            Self {
                init_calls: 0,
                teardown_calls: 0,
                live: false,
                fail_when_gain: None,
            }
        }
    }

    impl AmiModel for FakeModel {
        fn initialize(&mut self, ctx: &InitContext) -> AmiResult<InitOutput> {
            self.close()?;
            self.init_calls += 1;

            let gain = ctx
                .params()
                .params
                .get("gain")
                .and_then(|n| n.as_value())
                .and_then(ParamValue::as_i64)
                .unwrap_or(1);

            if self.fail_when_gain == Some(gain) {
                return Err(AmiError::init_failed(2, "gain unsupported"));
            }

            let spu = ctx.samples_per_ui();
            let mut shaped = vec![0.0; ctx.row_size()];
            for (i, &x) in ctx.channel().iter().enumerate() {
                let scale = gain as f64;
                shaped[i] += 0.8 * scale * x;
                if i + spu < shaped.len() {
                    shaped[i + spu] += -0.2 * scale * x;
                }
            }

            self.live = true;
            Ok(InitOutput {
                impulse: Waveform::new(shaped, ctx.sample_interval()),
                params_out: None,
                message: Some(format!("gain={gain}")),
            })
        }

        fn close(&mut self) -> AmiResult<()> {
            if self.live {
                self.teardown_calls += 1;
                self.live = false;
            }
            Ok(())
        }
    }

    fn template() -> SweepTemplate {
        let mut params = ParamTree::new("fake_tx");
        params.params.set("gain", ParamNode::leaf(1));

        let mut channel = vec![0.0; 64 * 8];
        channel[0] = 1.0;

        SweepTemplate {
            params,
            channel,
            sample_interval: Seconds(1.0 / (10e9 * 8.0)),
            bit_time: Seconds(1.0 / 10e9),
            aggressors: 0,
            fft_points: 256,
        }
    }

    fn labeled(label: &str, gain: Option<i64>) -> SweepConfig {
        let mut overrides = ParamBranch::new();
        if let Some(gain) = gain {
            overrides.set("gain", ParamNode::leaf(gain));
        }
        SweepConfig {
            label: label.to_string(),
            overrides,
        }
    }

    #[test]
    fn test_sweep_preserves_submission_order() {
        let mut model = FakeModel::new();
        let configs = vec![
            labeled("A", Some(1)),
            labeled("B", Some(2)),
            labeled("C", Some(3)),
        ];

        let results = run_sweep(&mut model, &template(), &configs).unwrap();
        let labels: Vec<_> = results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["A", "B", "C"]);
        assert_eq!(model.init_calls, 3);
    }

    #[test]
    fn test_overrides_reach_the_model() {
        let mut model = FakeModel::new();
        let results =
            run_sweep(&mut model, &template(), &[labeled("scaled", Some(3))]).unwrap();

        let cursors = &results[0].cursors;
        assert_eq!(cursors.main_index, 0);
        assert!((cursors.main - 2.4).abs() < 1e-12);
        assert!((cursors.post1 + 0.6).abs() < 1e-12);
        assert_eq!(results[0].message.as_deref(), Some("gain=3"));
    }

    #[test]
    fn test_failure_aborts_and_names_the_configuration() {
        let mut model = FakeModel::new();
        model.fail_when_gain = Some(2);
        let configs = vec![
            labeled("A", Some(1)),
            labeled("B", Some(2)),
            labeled("C", Some(3)),
        ];

        let err = run_sweep(&mut model, &template(), &configs).unwrap_err();
        assert!(err.to_string().contains("'B'"), "got: {err:#}");
        // A ran, B failed, C never started
        assert_eq!(model.init_calls, 2);
    }

    #[test]
    fn test_invalid_template_surfaces_label() {
        let mut model = FakeModel::new();
        let mut bad = template();
        bad.channel.clear();

        let err = run_sweep(&mut model, &bad, &[labeled("only", None)]).unwrap_err();
        assert!(err.to_string().contains("'only'"));
        assert_eq!(model.init_calls, 0);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut model = FakeModel::new();
        run_sweep(&mut model, &template(), &[labeled("A", None)]).unwrap();

        model.close().unwrap();
        model.close().unwrap();
        assert_eq!(model.teardown_calls, 1);
    }

    #[test]
    fn test_reinit_retires_prior_state() {
        let mut model = FakeModel::new();
        let configs = vec![labeled("A", None), labeled("B", None)];
        run_sweep(&mut model, &template(), &configs).unwrap();

        // B's init closed A's state; B's state is still live
        assert_eq!(model.teardown_calls, 1);
        model.close().unwrap();
        assert_eq!(model.teardown_calls, 2);
    }
}
