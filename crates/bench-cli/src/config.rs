//! Bench configuration loading and validation.
//!
//! A bench file describes one model and everything needed to exercise it:
//! timing, the channel stimulus, analysis settings, the base parameter
//! tree, and an optional list of labeled parameter overrides to sweep.
//!
//! TOML example:
//!
//! ```toml
//! name = "tx pre-emphasis comparison"
//! model = "models/example_tx.so"
//!
//! [timing]
//! bit_rate_gbps = 10.0
//! samples_per_ui = 32
//!
//! [channel]
//! type = "impulse"
//! length_ui = 200
//!
//! [analysis]
//! fft_points = 4096
//!
//! [parameters.example_tx]
//! tx_tap_units = 27
//! tx_tap_np1 = 4
//! tx_tap_nm1 = 8
//! tx_tap_nm2 = 3
//!
//! [[sweep]]
//! label = "no pre-emphasis"
//! overrides = { tx_tap_np1 = 0, tx_tap_nm1 = 0, tx_tap_nm2 = 0 }
//! ```

use anyhow::{bail, Context, Result};
use lib_types::params::{ParamBranch, ParamNode, ParamTree, ParamValue};
use lib_types::units::{BitsPerSecond, Seconds};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level bench configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Bench name/description.
    pub name: String,

    /// Path to the model shared library.
    pub model: PathBuf,

    /// Timing configuration.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Channel stimulus configuration.
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Analysis configuration.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Base parameter tree: exactly one root key (the model name) mapping
    /// to a table of parameters.
    pub parameters: BTreeMap<String, serde_json::Value>,

    /// Labeled parameter overrides to sweep, in order.
    #[serde(default)]
    pub sweep: Vec<SweepEntry>,
}

/// Timing configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Data rate in Gbps.
    #[serde(default = "default_bit_rate_gbps")]
    pub bit_rate_gbps: f64,

    /// Samples per unit interval.
    #[serde(default = "default_samples_per_ui")]
    pub samples_per_ui: usize,
}

fn default_bit_rate_gbps() -> f64 {
    10.0
}
fn default_samples_per_ui() -> usize {
    32
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            bit_rate_gbps: default_bit_rate_gbps(),
            samples_per_ui: default_samples_per_ui(),
        }
    }
}

/// Channel stimulus: an ideal impulse or a response loaded from CSV.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelConfig {
    /// Ideal delta at sample 0, `length_ui` unit intervals long.
    Impulse {
        #[serde(default = "default_length_ui")]
        length_ui: usize,
    },

    /// Channel response read from a CSV file (last column is amplitude).
    Csv { path: PathBuf },
}

fn default_length_ui() -> usize {
    200
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::Impulse {
            length_ui: default_length_ui(),
        }
    }
}

/// Analysis configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// FFT length for the frequency response (power of two).
    #[serde(default = "default_fft_points")]
    pub fft_points: usize,
}

fn default_fft_points() -> usize {
    4096
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_points: default_fft_points(),
        }
    }
}

/// One sweep configuration: a label plus parameter overrides applied to the
/// base tree's children.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepEntry {
    /// Label reported with this configuration's results.
    pub label: String,

    /// Overrides merged onto the base parameters.
    #[serde(default)]
    pub overrides: BTreeMap<String, serde_json::Value>,
}

/// Load configuration from a TOML or JSON file (chosen by extension).
pub fn load_config(path: &Path) -> Result<BenchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: BenchConfig = if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content).with_context(|| "Failed to parse config as TOML")?
    };

    validate_config(&config)?;

    Ok(config)
}

/// Validate configuration.
fn validate_config(config: &BenchConfig) -> Result<()> {
    if !(config.timing.bit_rate_gbps > 0.0) {
        bail!("bit_rate_gbps must be positive, got {}", config.timing.bit_rate_gbps);
    }
    if config.timing.samples_per_ui == 0 {
        bail!("samples_per_ui must be at least 1");
    }
    if !config.analysis.fft_points.is_power_of_two() {
        bail!(
            "fft_points must be a power of 2, got {}",
            config.analysis.fft_points
        );
    }
    if let ChannelConfig::Impulse { length_ui } = config.channel {
        if length_ui == 0 {
            bail!("channel length_ui must be at least 1");
        }
    }
    if config.parameters.len() != 1 {
        bail!(
            "parameters must have exactly one root key (the model name), got {}",
            config.parameters.len()
        );
    }
    if let Some((root, value)) = config.parameters.iter().next() {
        if !value.is_object() {
            bail!("parameters.{root} must be a table of model parameters");
        }
    }
    for entry in &config.sweep {
        if entry.label.trim().is_empty() {
            bail!("sweep entries must carry a non-empty label");
        }
    }
    Ok(())
}

impl BenchConfig {
    /// Unit interval derived from the data rate.
    pub fn bit_time(&self) -> Seconds {
        BitsPerSecond::from_gbps(self.timing.bit_rate_gbps).ui()
    }

    /// Sample interval derived from the unit interval.
    pub fn sample_interval(&self) -> Seconds {
        Seconds(self.bit_time().0 / self.timing.samples_per_ui as f64)
    }

    /// Build the base parameter tree from the configuration table.
    pub fn base_tree(&self) -> Result<ParamTree> {
        let (root, value) = self
            .parameters
            .iter()
            .next()
            .context("parameters table is empty")?;

        let node = value_to_node(value)
            .with_context(|| format!("in parameters.{root}"))?;
        match node {
            ParamNode::Branch(params) => Ok(ParamTree {
                name: root.clone(),
                params,
            }),
            ParamNode::Leaf(_) => bail!("parameters.{root} must be a table"),
        }
    }

    /// Build the override branch for one sweep entry.
    pub fn override_branch(entry: &SweepEntry) -> Result<ParamBranch> {
        let mut branch = ParamBranch::new();
        for (name, value) in &entry.overrides {
            let node = value_to_node(value)
                .with_context(|| format!("in sweep '{}' override '{name}'", entry.label))?;
            branch.set(name.clone(), node);
        }
        Ok(branch)
    }

    /// Materialize the channel stimulus samples.
    pub fn channel_samples(&self) -> Result<Vec<f64>> {
        match &self.channel {
            ChannelConfig::Impulse { length_ui } => {
                let mut samples = vec![0.0; length_ui * self.timing.samples_per_ui];
                samples[0] = 1.0;
                Ok(samples)
            }
            ChannelConfig::Csv { path } => read_channel_csv(path),
        }
    }
}

/// Convert a config value into a parameter node.
///
/// Tables nest into subtrees; integers, floats, and strings become leaves.
/// Anything else has no representation in the parameter grammar.
fn value_to_node(value: &serde_json::Value) -> Result<ParamNode> {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(ParamNode::Leaf(ParamValue::Integer(i)))
            } else if let Some(f) = n.as_f64() {
                Ok(ParamNode::Leaf(ParamValue::Float(f)))
            } else {
                bail!("number {n} cannot be represented as a model parameter")
            }
        }
        serde_json::Value::String(s) => Ok(ParamNode::Leaf(ParamValue::String(s.clone()))),
        serde_json::Value::Object(map) => {
            let mut branch = ParamBranch::new();
            for (name, value) in map {
                branch.set(name.clone(), value_to_node(value)?);
            }
            Ok(ParamNode::Branch(branch))
        }
        other => bail!("unsupported parameter value: {other}"),
    }
}

/// Read a channel response from a CSV file.
///
/// Takes the last comma-separated field of each line as the amplitude and
/// skips a non-numeric header row.
fn read_channel_csv(path: &Path) -> Result<Vec<f64>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read channel file: {:?}", path))?;

    let mut samples = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let field = line.rsplit(',').next().unwrap_or(line).trim();
        match field.parse::<f64>() {
            Ok(v) => samples.push(v),
            Err(_) if lineno == 0 => continue, // header row
            Err(_) => bail!("invalid amplitude {field:?} on line {}", lineno + 1),
        }
    }

    if samples.is_empty() {
        bail!("channel file {:?} contains no samples", path);
    }
    Ok(samples)
}
