//! Shaped-impulse analysis example.
//!
//! This example demonstrates:
//! 1. Building a synthetic pre-emphasized transmitter response
//! 2. Extracting the main/pre/post cursor taps
//! 3. Computing the frequency-domain magnitude response

use lib_analysis::{find_cursors, frequency_response};
use lib_types::units::{BitsPerSecond, Seconds};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bit_rate = BitsPerSecond::from_gbps(10.0);
    let samples_per_ui = 32;
    let ui = bit_rate.ui();
    let dt = Seconds(ui.0 / samples_per_ui as f64);

    println!("=== AMI-Bench Shaped Probe Example ===\n");
    println!(
        "Timing: {:.0} Gbps, {} samples/UI, dt = {:.3} ps",
        bit_rate.as_gbps(),
        samples_per_ui,
        dt.as_ps()
    );

    // Synthetic four-tap FIR shape the way a de-emphasizing transmitter
    // would render an ideal channel impulse
    let impulse = synthetic_tx_response(200 * samples_per_ui, samples_per_ui);

    println!("\nExtracting cursors...");
    let cursors = find_cursors(&impulse, samples_per_ui)?;
    println!("  Main tap:  {:.4} at sample {}", cursors.main, cursors.main_index);
    println!("  Pre-tap:   {:.4}", cursors.pre);
    println!("  Post-1:    {:.4}", cursors.post1);
    println!("  Post-2:    {:.4}", cursors.post2);

    println!("\nComputing frequency response (4096 points)...");
    let spectrum = frequency_response(&impulse, dt, 4096)?;
    let dc = spectrum.magnitude_db[0];
    let nyquist = *spectrum.magnitude_db.last().unwrap();
    println!("  {} frequency points up to {:.1} GHz", spectrum.len(), spectrum.frequencies.last().unwrap() * 1e-9);
    println!("  DC gain: {dc:.2} dB");
    println!("  Gain at Nyquist: {nyquist:.2} dB");

    println!("\n=== Summary ===");
    if nyquist > dc {
        println!("High-frequency boost detected: the shape pre-compensates channel loss");
    } else {
        println!("No high-frequency boost: the shape is flat or lowpass");
    }

    Ok(())
}

/// Build a pre-emphasized impulse response: main tap at one UI in, with
/// pre/post cursors carrying de-emphasis energy.
fn synthetic_tx_response(len: usize, samples_per_ui: usize) -> Vec<f64> {
    let mut samples = vec![0.0; len];
    let main = samples_per_ui;

    samples[main - samples_per_ui] = -0.10;
    samples[main] = 0.62;
    samples[main + samples_per_ui] = -0.22;
    samples[main + 2 * samples_per_ui] = -0.06;
    samples
}
