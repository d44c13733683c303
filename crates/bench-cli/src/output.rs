//! Result output formatting and writing.

use crate::sweep::SweepResult;
use crate::OutputFormat;
use anyhow::Result;
use lib_types::params::{ParamNode, ParamTree, ParamValue};
use std::io::Write;
use std::path::Path;

/// Write sweep results to the output directory.
///
/// Every configuration gets an impulse-response CSV and a spectrum CSV for
/// downstream plotting, plus one cursor summary in the requested format.
pub fn write_results(results: &[SweepResult], output_dir: &Path, format: OutputFormat) -> Result<()> {
    for result in results {
        let slug = slugify(&result.label);

        let impulse_path = output_dir.join(format!("{slug}_impulse.csv"));
        let mut f = std::fs::File::create(&impulse_path)?;
        writeln!(f, "time_ns,amplitude")?;
        for (i, &v) in result.impulse.samples.iter().enumerate() {
            writeln!(f, "{},{}", result.impulse.time_at(i).as_ns(), v)?;
        }

        let spectrum_path = output_dir.join(format!("{slug}_spectrum.csv"));
        let mut f = std::fs::File::create(&spectrum_path)?;
        writeln!(f, "freq_ghz,magnitude_db")?;
        for (freq, db) in result
            .spectrum
            .frequencies
            .iter()
            .zip(result.spectrum.magnitude_db.iter())
        {
            writeln!(f, "{},{}", freq * 1e-9, db)?;
        }

        tracing::info!(label = %result.label, "Wrote impulse and spectrum CSVs");
    }

    let summary_path = output_dir.join(match format {
        OutputFormat::Text => "summary.txt",
        OutputFormat::Json => "summary.json",
        OutputFormat::Csv => "summary.csv",
    });
    let mut f = std::fs::File::create(&summary_path)?;

    match format {
        OutputFormat::Text => {
            writeln!(f, "Cursor Summary")?;
            writeln!(f, "==============")?;
            for result in results {
                let c = &result.cursors;
                writeln!(f)?;
                writeln!(f, "{}", result.label)?;
                writeln!(f, "  Main tap:  {:.4} at sample {}", c.main, c.main_index)?;
                writeln!(f, "  Pre-tap:   {:.4}", c.pre)?;
                writeln!(f, "  Post-1:    {:.4}", c.post1)?;
                writeln!(f, "  Post-2:    {:.4}", c.post2)?;
                if let Some(msg) = &result.message {
                    writeln!(f, "  Model says: {}", msg.trim())?;
                }
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = results
                .iter()
                .map(|result| {
                    serde_json::json!({
                        "label": result.label,
                        "cursors": result.cursors,
                        "message": result.message,
                    })
                })
                .collect();
            writeln!(f, "{}", serde_json::to_string_pretty(&entries)?)?;
        }
        OutputFormat::Csv => {
            writeln!(f, "label,main_index,main,pre,post1,post2")?;
            for result in results {
                let c = &result.cursors;
                writeln!(
                    f,
                    "{},{},{},{},{},{}",
                    result.label, c.main_index, c.main, c.pre, c.post1, c.post2
                )?;
            }
        }
    }

    tracing::info!("Wrote summary to {:?}", summary_path);
    Ok(())
}

/// Print results to stdout.
pub fn print_results(results: &[SweepResult]) {
    for result in results {
        let c = &result.cursors;
        println!("\n{}", result.label);
        println!("  Main tap:  {:.4} at sample {}", c.main, c.main_index);
        println!("  Pre-tap:   {:.4}", c.pre);
        println!("  Post-1:    {:.4}", c.post1);
        println!("  Post-2:    {:.4}", c.post2);
        if let Some(msg) = &result.message {
            println!("  Model says: {}", msg.trim());
        }
        if let Some(params) = &result.params_out {
            println!("  Returned parameters:");
            print_tree(params);
        }
    }
    println!();
}

/// Pretty-print a parameter tree with two-space indentation.
pub fn print_tree(tree: &ParamTree) {
    println!("    {}", tree.name);
    for (name, node) in tree.params.iter() {
        print_node(name, node, 3);
    }
}

fn print_node(name: &str, node: &ParamNode, depth: usize) {
    let pad = "  ".repeat(depth);
    match node {
        ParamNode::Leaf(value) => println!("{pad}{name} = {}", render_value(value)),
        ParamNode::Branch(branch) => {
            println!("{pad}{name}");
            for (child, node) in branch.iter() {
                print_node(child, node, depth + 1);
            }
        }
    }
}

fn render_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Integer(i) => i.to_string(),
        ParamValue::Float(f) => f.to_string(),
        ParamValue::String(s) => format!("{s:?}"),
    }
}

/// Reduce a configuration label to a safe file-name stem.
fn slugify(label: &str) -> String {
    let mut slug: String = label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    slug.truncate(64);
    if slug.is_empty() {
        slug.push_str("config");
    }
    slug
}
