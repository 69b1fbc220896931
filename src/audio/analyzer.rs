use crate::audio::correlation::LagCorrelator;
use crate::audio::envelope::EnergyEnvelopeBuilder;
use crate::audio::scoring::TempoScorer;
use crate::audio::types::{AnalysisConfig, AnalysisTrace, AudioData, TempoReport};
use crate::error::{AudioError, Result};

/// Tempo analysis pipeline: envelope, lag search, scoring.
///
/// The analyzer holds only its immutable configuration, so one instance can
/// be shared across threads and every call is independent of the others.
#[derive(Debug, Clone)]
pub struct TempoAnalyzer {
    config: AnalysisConfig,
    envelope: EnergyEnvelopeBuilder,
    correlator: LagCorrelator,
    scorer: TempoScorer,
}

impl TempoAnalyzer {
    /// Create a new analyzer with default configuration
    pub fn new() -> Self {
        Self::build(AnalysisConfig::default())
    }

    /// Create a new analyzer with custom configuration
    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|details| AudioError::InvalidParameters { details })?;
        Ok(Self::build(config))
    }

    fn build(config: AnalysisConfig) -> Self {
        Self {
            envelope: EnergyEnvelopeBuilder::new(),
            correlator: LagCorrelator::from_config(&config),
            scorer: TempoScorer::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Estimate tempo, energy and danceability of a mono waveform.
    ///
    /// Returns `None` for input too short to hold a single lag of the tempo
    /// range, including empty input.
    pub fn analyze(&self, samples: &[f32], sample_rate: u32) -> Option<TempoReport> {
        self.analyze_detailed(samples, sample_rate).report
    }

    /// Same as [`analyze`](Self::analyze) but keeps the intermediate envelope
    /// and correlation, e.g. for gating on the correlation profile.
    pub fn analyze_detailed(&self, samples: &[f32], sample_rate: u32) -> AnalysisTrace {
        let envelope = self.envelope.build(samples, sample_rate);
        let correlation = self.correlator.correlate(&envelope);
        let report = self.scorer.score(&envelope, &correlation);

        AnalysisTrace { envelope, correlation, report }
    }

    /// Analyze decoded audio, collapsing it to one channel first
    pub fn analyze_audio(&self, audio: &AudioData) -> Option<TempoReport> {
        tracing::debug!(
            "Analyzing {}: {:.1}s, {} Hz, {} channels",
            audio.source,
            audio.duration,
            audio.sample_rate,
            audio.channels
        );

        let samples = audio.analysis_samples(self.config.channel);
        let report = self.analyze(&samples, audio.sample_rate);

        match &report {
            Some(r) => tracing::debug!(
                "{}: {} BPM, energy {}, danceability {}",
                audio.source,
                r.bpm,
                r.energy,
                r.danceability
            ),
            None => tracing::debug!("{}: too short for tempo analysis", audio.source),
        }
        report
    }
}

impl Default for TempoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze a mono waveform with the default 60-200 BPM configuration.
///
/// Perfectly periodic input with no lead-in can score its beat lag and the
/// lag's multiples equally; see [`synth::click_train`](crate::audio::synth::click_train).
pub fn analyze(samples: &[f32], sample_rate: u32) -> Option<TempoReport> {
    TempoAnalyzer::new().analyze(samples, sample_rate)
}
