use crate::audio::types::{
    AnalysisConfig, Correlation, CorrelationPoint, EnergyEnvelope, TempoReport,
};

/// Turns a lag search result into a [`TempoReport`].
///
/// Both auxiliary scores are empirical linear mappings; the scales are
/// calibration knobs, not physical constants.
#[derive(Debug, Clone, Copy)]
pub struct TempoScorer {
    energy_scale: f64,
    danceability_scale: f64,
}

impl TempoScorer {
    pub fn new() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            energy_scale: config.energy_scale,
            danceability_scale: config.danceability_scale,
        }
    }

    /// Build the report, or `None` when the search found no lag
    pub fn score(
        &self,
        envelope: &EnergyEnvelope,
        correlation: &Correlation,
    ) -> Option<TempoReport> {
        let winner = CorrelationPoint {
            lag: correlation.best_lag?,
            score: correlation.peak_score().unwrap_or_default(),
        };
        let bpm = winner.bpm(envelope.rate()).round() as u32;

        Some(TempoReport {
            bpm,
            energy: self.energy(envelope),
            danceability: self.danceability(correlation),
        })
    }

    /// Mean envelope RMS, scaled to 0-100
    pub fn energy(&self, envelope: &EnergyEnvelope) -> u8 {
        to_percent(envelope.mean() * self.energy_scale)
    }

    /// How far the correlation peak stands above the average lag, scaled to 0-100.
    ///
    /// A flat distribution scores 0; a zero average is treated as 1.
    pub fn danceability(&self, correlation: &Correlation) -> u8 {
        let distribution = &correlation.distribution;
        let Some(peak) = distribution.peak() else {
            return 0;
        };

        let mean = distribution.mean_score();
        let ratio = peak.score / if mean != 0.0 { mean } else { 1.0 };
        to_percent((ratio - 1.0) * self.danceability_scale)
    }
}

impl Default for TempoScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::correlation::LagCorrelator;
    use crate::audio::types::CorrelationDistribution;

    fn correlation(points: &[(usize, f64)], best_lag: Option<usize>) -> Correlation {
        let mut distribution = CorrelationDistribution::default();
        for &(lag, score) in points {
            distribution.push(CorrelationPoint { lag, score });
        }
        Correlation { best_lag, distribution }
    }

    #[test]
    fn test_no_lag_no_report() {
        let envelope = EnergyEnvelope::from_values(vec![0.3; 10]);
        assert_eq!(TempoScorer::new().score(&envelope, &correlation(&[], None)), None);
    }

    #[test]
    fn test_bpm_from_lag() {
        let envelope = EnergyEnvelope::from_values(vec![0.0; 200]);
        let scorer = TempoScorer::new();

        for &(lag, bpm) in &[(30, 200), (50, 120), (100, 60), (47, 128), (35, 171)] {
            let report = scorer.score(&envelope, &correlation(&[(lag, 1.0)], Some(lag))).unwrap();
            assert_eq!(report.bpm, bpm, "lag {}", lag);
        }
    }

    #[test]
    fn test_energy_scaling_and_clamp() {
        let scorer = TempoScorer::new();
        assert_eq!(scorer.energy(&EnergyEnvelope::from_values(vec![0.2; 50])), 30);
        assert_eq!(scorer.energy(&EnergyEnvelope::from_values(vec![0.9; 50])), 100);
        assert_eq!(scorer.energy(&EnergyEnvelope::from_values(vec![])), 0);
    }

    #[test]
    fn test_danceability_from_peak_ratio() {
        // mean = 1.0, peak = 2.0 -> (2 - 1) * 40
        let corr = correlation(&[(30, 0.5), (31, 0.5), (32, 2.0), (33, 1.0)], Some(32));
        assert_eq!(TempoScorer::new().danceability(&corr), 40);
    }

    #[test]
    fn test_danceability_flat_and_empty() {
        let flat = correlation(&[(30, 0.4), (31, 0.4), (32, 0.4)], Some(30));
        assert_eq!(TempoScorer::new().danceability(&flat), 0);

        let empty = correlation(&[], None);
        assert_eq!(TempoScorer::new().danceability(&empty), 0);
    }

    #[test]
    fn test_silence_scores_zero() {
        let envelope = EnergyEnvelope::from_values(vec![0.0; 200]);
        let corr = LagCorrelator::new().correlate(&envelope);
        let report = TempoScorer::new().score(&envelope, &corr).unwrap();

        assert_eq!(report, TempoReport { bpm: 200, energy: 0, danceability: 0 });
    }

    #[test]
    fn test_custom_calibration() {
        let config = AnalysisConfig {
            energy_scale: 100.0,
            danceability_scale: 10.0,
            ..Default::default()
        };
        let scorer = TempoScorer::from_config(&config);

        assert_eq!(scorer.energy(&EnergyEnvelope::from_values(vec![0.2; 50])), 20);
        let corr = correlation(&[(30, 0.5), (31, 0.5), (32, 2.0), (33, 1.0)], Some(32));
        assert_eq!(scorer.danceability(&corr), 10);
    }
}
