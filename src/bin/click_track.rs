// Writes a click-train WAV with a known tempo, for checking the analyzer by ear
// or feeding it back through `vibe-bpm`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use vibe_bpm::audio::{analyze, synth};

#[derive(Parser)]
#[command(name = "click-track", version, about = "Generate a click-train WAV at a given tempo")]
struct Args {
    /// Tempo of the clicks
    #[arg(short, long, default_value_t = 120.0)]
    bpm: f64,

    /// Number of clicks
    #[arg(short = 'n', long, default_value_t = 32)]
    beats: usize,

    /// Sample rate of the output file
    #[arg(short, long, default_value_t = 44100)]
    sample_rate: u32,

    /// Output WAV path
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let samples = synth::click_train(args.bpm, args.sample_rate, args.beats);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: args.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&args.output, spec)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    for &s in &samples {
        writer.write_sample((s * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    tracing::info!(
        "Wrote {} samples ({:.1}s at {} BPM) to {}",
        samples.len(),
        samples.len() as f64 / args.sample_rate as f64,
        args.bpm,
        args.output.display()
    );

    match analyze(&samples, args.sample_rate) {
        Some(report) => println!(
            "Analyzer reads {} BPM (energy {}%, danceability {}%)",
            report.bpm, report.energy, report.danceability
        ),
        None => println!("Too short for the analyzer to find a tempo"),
    }

    Ok(())
}
