//! # Audio Analysis Module
//!
//! Blind tempo estimation from decoded PCM audio, plus the decoding needed to
//! get there.
//!
//! ## Pipeline
//!
//! - **Energy envelope**: 10 ms RMS windows reduce any sample rate to a 100 Hz
//!   energy curve ([`EnergyEnvelopeBuilder`])
//! - **Lag search**: mean-normalized autocorrelation over the lags of the
//!   60-200 BPM range ([`LagCorrelator`])
//! - **Scoring**: BPM from the winning lag, energy from the mean envelope,
//!   danceability from how sharply the correlation peaks ([`TempoScorer`])
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vibe_bpm::audio::{AudioLoader, TempoAnalyzer};
//!
//! # fn main() -> anyhow::Result<()> {
//! let audio = AudioLoader::load("song.wav")?;
//!
//! let analyzer = TempoAnalyzer::new();
//! if let Some(report) = analyzer.analyze_audio(&audio) {
//!     println!("Detected BPM: {}", report.bpm);
//!     println!("Energy: {}%, danceability: {}%", report.energy, report.danceability);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod correlation;
pub mod envelope;
pub mod loader;
pub mod scoring;
pub mod synth;
pub mod types;

pub use analyzer::{analyze, TempoAnalyzer};
pub use correlation::LagCorrelator;
pub use envelope::EnergyEnvelopeBuilder;
pub use loader::AudioLoader;
pub use scoring::TempoScorer;
pub use types::{
    AnalysisConfig, AnalysisTrace, AudioData, AudioFormat, ChannelMode, Correlation,
    CorrelationDistribution, CorrelationPoint, EnergyEnvelope, TempoReport, ENVELOPE_RATE,
};
