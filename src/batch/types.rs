use serde::{Deserialize, Serialize};

use crate::audio::TempoReport;

/// Result of analyzing one track in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackAnalysis {
    /// File path or caller-supplied label of the track
    pub source: String,

    pub outcome: TrackOutcome,
}

impl TrackAnalysis {
    pub fn report(&self) -> Option<&TempoReport> {
        match &self.outcome {
            TrackOutcome::Analyzed(report) => Some(report),
            _ => None,
        }
    }
}

/// What happened to a single track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrackOutcome {
    /// Analysis produced a report
    Analyzed(TempoReport),

    /// Decoded fine but too short for the tempo range
    NoResult,

    /// Loading, decoding or the analysis task itself failed
    Failed { reason: String },
}

impl TrackOutcome {
    pub(crate) fn from_report(report: Option<TempoReport>) -> Self {
        match report {
            Some(report) => Self::Analyzed(report),
            None => Self::NoResult,
        }
    }

    pub(crate) fn failed<S: Into<String>>(reason: S) -> Self {
        Self::Failed { reason: reason.into() }
    }
}

/// Progress handed to the refresh callback after each batch completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// Zero-based index of the batch that just finished
    pub batch_index: usize,

    pub batch_count: usize,

    /// Tracks finished so far, this batch included
    pub completed: usize,

    pub total: usize,
}

impl BatchProgress {
    pub fn is_last(&self) -> bool {
        self.batch_index + 1 == self.batch_count
    }
}

/// Aggregate "vibe" of a set of analyzed tracks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub analyzed: usize,
    pub no_result: usize,
    pub failed: usize,

    /// Mean tempo over tracks with a non-zero BPM, truncated
    pub mean_bpm: Option<u32>,

    pub mean_energy: Option<u8>,

    pub mean_danceability: Option<u8>,
}

impl BatchSummary {
    pub fn from_results(results: &[TrackAnalysis]) -> Self {
        let mut summary = Self::default();
        let mut reports = Vec::new();

        for track in results {
            match &track.outcome {
                TrackOutcome::Analyzed(report) => {
                    summary.analyzed += 1;
                    if report.bpm > 0 {
                        reports.push(*report);
                    }
                }
                TrackOutcome::NoResult => summary.no_result += 1,
                TrackOutcome::Failed { .. } => summary.failed += 1,
            }
        }

        if !reports.is_empty() {
            let n = reports.len() as u64;
            let mean = |f: fn(&TempoReport) -> u64| reports.iter().map(f).sum::<u64>() / n;

            summary.mean_bpm = Some(mean(|r| r.bpm as u64) as u32);
            summary.mean_energy = Some(mean(|r| r.energy as u64) as u8);
            summary.mean_danceability = Some(mean(|r| r.danceability as u64) as u8);
        }

        summary
    }
}
