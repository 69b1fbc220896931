use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vibe_bpm::{
    audio::TempoAnalyzer,
    batch::{BatchAnalyzer, BatchSummary, TrackAnalysis, TrackOutcome},
    config::Config,
};

#[derive(Parser)]
#[command(
    name = "vibe-bpm",
    version,
    about = "Estimate tempo, energy and danceability of audio files",
    long_about = "vibe-bpm decodes each file, reduces it to a 100 Hz energy envelope and \
                  picks the strongest autocorrelation lag in the 60-200 BPM range. \
                  No beat grid or metadata is needed."
)]
struct Cli {
    /// Audio files to analyze (WAV, MP3, FLAC, OGG, M4A, AAC)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tracks started together per batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Maximum tracks decoded at the same time
    #[arg(short, long)]
    workers: Option<usize>,

    /// Slowest tempo to search for
    #[arg(long)]
    min_bpm: Option<f32>,

    /// Fastest tempo to search for
    #[arg(long)]
    max_bpm: Option<f32>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    tracks: &'a [TrackAnalysis],
    summary: BatchSummary,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting vibe-bpm v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };

    if let Some(batch_size) = cli.batch_size {
        config.batch.batch_size = batch_size;
    }
    if let Some(workers) = cli.workers {
        config.batch.max_workers = workers;
    }
    if let Some(min_bpm) = cli.min_bpm {
        config.analysis.min_bpm = min_bpm;
    }
    if let Some(max_bpm) = cli.max_bpm {
        config.analysis.max_bpm = max_bpm;
    }
    config.validate().context("invalid settings")?;

    let analyzer = TempoAnalyzer::with_config(config.analysis.clone())?;
    let batch = BatchAnalyzer::new(analyzer, config.batch.clone())?;

    let json = cli.json;
    let results = batch
        .analyze_files(cli.files, |progress, tracks| {
            if !json {
                for track in tracks {
                    println!("{}", format_track(track));
                }
            }
            let running = BatchSummary::from_results(tracks);
            info!(
                "Batch {}/{}: {}/{} tracks done, {} analyzed in this batch",
                progress.batch_index + 1,
                progress.batch_count,
                progress.completed,
                progress.total,
                running.analyzed
            );
        })
        .await;

    let summary = BatchSummary::from_results(&results);

    if json {
        let output = JsonOutput { tracks: &results, summary };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", format_summary(&summary));
    }

    Ok(())
}

fn format_track(track: &TrackAnalysis) -> String {
    match &track.outcome {
        TrackOutcome::Analyzed(report) => format!(
            "{}: {} BPM (x2: {}) | energy {}% | danceability {}%",
            track.source,
            report.bpm,
            report.double_time_bpm(),
            report.energy,
            report.danceability
        ),
        TrackOutcome::NoResult => format!("{}: -- (too short)", track.source),
        TrackOutcome::Failed { reason } => format!("{}: -- ({})", track.source, reason),
    }
}

fn format_summary(summary: &BatchSummary) -> String {
    let mut line = format!(
        "{} analyzed, {} without result, {} failed",
        summary.analyzed, summary.no_result, summary.failed
    );
    if let (Some(bpm), Some(energy), Some(dance)) =
        (summary.mean_bpm, summary.mean_energy, summary.mean_danceability)
    {
        line.push_str(&format!(
            " | vibe: {} BPM, energy {}%, danceability {}%",
            bpm, energy, dance
        ));
    }
    line
}
