//! Batch orchestration over many tracks.
//!
//! Every track is analyzed independently, so the work is a plain fork-join:
//! start a batch, wait for all of it, report progress, move on.

pub mod runner;
pub mod types;

pub use runner::BatchAnalyzer;
pub use types::{BatchProgress, BatchSummary, TrackAnalysis, TrackOutcome};
