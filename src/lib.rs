//! # vibe-bpm
//!
//! Blind tempo, energy and danceability estimation from decoded PCM audio.
//!
//! The analysis needs no beat grid or metadata: it reduces the waveform to a
//! 100 Hz energy envelope, searches the lags of the 60-200 BPM range for the
//! strongest autocorrelation, and derives two 0-100 scores from the envelope
//! and the shape of the correlation curve.
//!
//! ## Quick Start
//!
//! ```rust
//! use vibe_bpm::audio::{analyze, synth};
//!
//! let samples = synth::click_train(120.0, 44100, 20);
//! let report = analyze(&samples, 44100).expect("long enough for a tempo");
//! assert!(report.bpm.abs_diff(120) <= 2);
//! ```
//!
//! ## Architecture
//!
//! - [`audio`] - Envelope, lag search, scoring, and decoding
//! - [`batch`] - Fork-join analysis of many tracks with progress callbacks
//! - [`config`] - Configuration management
//! - [`error`] - Error types for the collaborators around the analysis core

pub mod audio;
pub mod batch;
pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use crate::{
    audio::{analyze, AudioData, AudioLoader, TempoAnalyzer, TempoReport},
    batch::{BatchAnalyzer, BatchSummary, TrackAnalysis, TrackOutcome},
    config::{BatchConfig, Config},
    error::{Result, VibeError},
};
