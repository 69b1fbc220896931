use crate::audio::types::{
    AnalysisConfig, Correlation, CorrelationDistribution, CorrelationPoint, EnergyEnvelope,
};

/// Lag-domain autocorrelation search over an energy envelope.
///
/// Only lags inside the configured tempo range are evaluated. Keeping the
/// window at 60-200 BPM is the only guard against half/double tempo picks;
/// no octave correction is applied afterwards.
#[derive(Debug, Clone, Copy)]
pub struct LagCorrelator {
    min_bpm: f32,
    max_bpm: f32,
}

impl LagCorrelator {
    /// Search the default 60-200 BPM range
    pub fn new() -> Self {
        let defaults = AnalysisConfig::default();
        Self::with_range(defaults.min_bpm, defaults.max_bpm)
    }

    pub fn with_range(min_bpm: f32, max_bpm: f32) -> Self {
        Self { min_bpm, max_bpm }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::with_range(config.min_bpm, config.max_bpm)
    }

    /// Inclusive lag bounds, in envelope samples, for the tempo range.
    ///
    /// The fastest tempo maps to the shortest lag. The lower bound never
    /// drops below 1. A zero or near-zero `min_bpm` yields a huge upper bound;
    /// [`correlate`](Self::correlate) only scans lags the envelope can hold.
    pub fn lag_range(&self, envelope_rate: u32) -> (usize, usize) {
        let beat_samples = 60.0 * envelope_rate as f64;
        let min_lag = (beat_samples / self.max_bpm as f64).floor() as usize;
        let max_lag = (beat_samples / self.min_bpm as f64).floor() as usize;
        (min_lag.max(1), max_lag)
    }

    /// Score every lag in range and pick the strongest.
    ///
    /// Lags with no overlapping pairs (envelope not longer than the lag) get
    /// no entry. Ties keep the first, i.e. shortest, lag.
    pub fn correlate(&self, envelope: &EnergyEnvelope) -> Correlation {
        let (min_lag, max_lag) = self.lag_range(envelope.rate());
        let values = envelope.values();

        // A lag needs at least one overlapping pair
        let last_lag = max_lag.min(values.len().saturating_sub(1));

        let mut distribution =
            CorrelationDistribution::with_capacity((last_lag + 1).saturating_sub(min_lag));
        let mut best: Option<CorrelationPoint> = None;

        for lag in min_lag..=last_lag {
            let count = values.len() - lag;

            let sum: f64 = values[..count]
                .iter()
                .zip(&values[lag..])
                .map(|(&a, &b)| a as f64 * b as f64)
                .sum();
            let point = CorrelationPoint { lag, score: sum / count as f64 };

            if best.map_or(true, |b| point.score > b.score) {
                best = Some(point);
            }
            distribution.push(point);
        }

        match best {
            Some(b) => tracing::debug!(
                "Lag search {}..={}: {} lags scored, best lag {} (score {:.6})",
                min_lag,
                max_lag,
                distribution.len(),
                b.lag,
                b.score
            ),
            None => tracing::debug!(
                "Lag search {}..={}: envelope of {} values too short",
                min_lag,
                max_lag,
                values.len()
            ),
        }

        Correlation {
            best_lag: best.map(|b| b.lag),
            distribution,
        }
    }
}

impl Default for LagCorrelator {
    fn default() -> Self {
        Self::new()
    }
}
