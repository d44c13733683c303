//! AMI-Bench CLI: load an IBIS-AMI model and exercise it across parameter
//! configurations.

mod config;
mod output;
mod sweep;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ami-bench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single initialization with the base parameters and report
    /// cursors and the returned parameter tree
    Probe {
        /// Path to the bench configuration file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Run every configured sweep entry and write comparison results
    Sweep {
        /// Path to the bench configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Parse a parameter-tree text file and pretty-print it
    DecodeParams {
        /// Path to the parameter text file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Probe { config } => run_probe(&config),
        Commands::Sweep { config, output } => run_sweep_command(&config, &output, cli.format),
        Commands::DecodeParams { file } => decode_params(&file),
    }
}

fn run_probe(config_path: &PathBuf) -> Result<()> {
    let config = config::load_config(config_path)?;
    let template = build_template(&config)?;

    println!("Probing model {:?}", config.model);
    println!("  Row size: {}", template.channel.len());
    println!("  Samples per UI: {}", config.timing.samples_per_ui);
    println!(
        "  Sample interval: {:.3} ps, bit time: {:.2} ps",
        config.sample_interval().as_ps(),
        config.bit_time().as_ps()
    );

    let configs = vec![sweep::SweepConfig {
        label: config.name.clone(),
        overrides: Default::default(),
    }];

    let results = sweep::run_model_sweep(&config.model, &template, &configs)?;
    output::print_results(&results);
    Ok(())
}

fn run_sweep_command(config_path: &PathBuf, output_dir: &PathBuf, format: OutputFormat) -> Result<()> {
    let config = config::load_config(config_path)?;
    let template = build_template(&config)?;

    let mut configs = Vec::new();
    for entry in &config.sweep {
        configs.push(sweep::SweepConfig {
            label: entry.label.clone(),
            overrides: config::BenchConfig::override_branch(entry)?,
        });
    }
    if configs.is_empty() {
        tracing::warn!("No sweep entries configured; running the base configuration only");
        configs.push(sweep::SweepConfig {
            label: "base".to_string(),
            overrides: Default::default(),
        });
    }

    tracing::info!(
        model = ?config.model,
        configurations = configs.len(),
        "Starting sweep"
    );
    let results = sweep::run_model_sweep(&config.model, &template, &configs)?;

    std::fs::create_dir_all(output_dir)?;
    output::write_results(&results, output_dir, format)?;
    output::print_results(&results);

    tracing::info!("Sweep complete. Results written to {:?}", output_dir);
    Ok(())
}

fn decode_params(file: &PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read parameter file: {:?}", file))?;

    let tree = lib_ptree::decode(&content)
        .with_context(|| format!("Failed to decode parameter tree from {:?}", file))?;

    output::print_tree(&tree);
    Ok(())
}

fn build_template(config: &config::BenchConfig) -> Result<sweep::SweepTemplate> {
    Ok(sweep::SweepTemplate {
        params: config.base_tree()?,
        channel: config.channel_samples()?,
        sample_interval: config.sample_interval(),
        bit_time: config.bit_time(),
        aggressors: 0,
        fft_points: config.analysis.fft_points,
    })
}
