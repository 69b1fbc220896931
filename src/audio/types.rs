use serde::{Deserialize, Serialize};

/// Rate of every energy envelope, in envelope samples per second (10 ms windows)
pub const ENVELOPE_RATE: u32 = 100;

/// Decoded audio with metadata
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples (interleaved for multi-channel, plain for mono)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Duration in seconds
    pub duration: f64,

    /// Where the audio came from (file path or a caller-supplied label)
    pub source: String,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioData {
    /// Wrap an already-decoded mono buffer
    pub fn from_mono<S: Into<String>>(samples: Vec<f32>, sample_rate: u32, source: S) -> Self {
        let duration = if sample_rate == 0 {
            0.0
        } else {
            samples.len() as f64 / sample_rate as f64
        };

        Self {
            samples,
            sample_rate,
            channels: 1,
            duration,
            source: source.into(),
            format: AudioFormat {
                extension: "pcm".to_string(),
                bit_depth: Some(32),
                compression: None,
            },
        }
    }

    /// Get samples for a specific channel (0-based)
    pub fn channel_samples(&self, channel: usize) -> Vec<f32> {
        if self.channels <= 1 || channel >= self.channels as usize {
            return self.samples.clone();
        }

        self.samples
            .iter()
            .skip(channel)
            .step_by(self.channels as usize)
            .copied()
            .collect()
    }

    /// Get mono mix of all channels
    pub fn mono_samples(&self) -> Vec<f32> {
        if self.channels <= 1 {
            return self.samples.clone();
        }

        self.samples
            .chunks(self.channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / self.channels as f32)
            .collect()
    }

    /// Collapse to the single channel the analyzer works on
    pub fn analysis_samples(&self, mode: ChannelMode) -> Vec<f32> {
        match mode {
            ChannelMode::First => self.channel_samples(0),
            ChannelMode::Mix => self.mono_samples(),
        }
    }
}

/// Audio file format information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFormat {
    /// File extension (wav, mp3, flac, etc.)
    pub extension: String,

    /// Bit depth (16, 24, 32, etc.)
    pub bit_depth: Option<u16>,

    /// Codec description for compressed formats
    pub compression: Option<String>,
}

/// How a multi-channel track is reduced to one channel before analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMode {
    /// Use channel 0 only
    #[default]
    First,

    /// Average all channels
    Mix,
}

/// Low-rate RMS energy curve of a waveform
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyEnvelope {
    values: Vec<f32>,
}

impl EnergyEnvelope {
    /// Build an envelope from precomputed RMS values.
    ///
    /// Negative or NaN inputs are clamped to zero so the non-negativity
    /// invariant always holds.
    pub fn from_values(values: Vec<f32>) -> Self {
        let values = values
            .into_iter()
            .map(|v| if v > 0.0 { v } else { 0.0 })
            .collect();
        Self { values }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Envelope samples per second; always [`ENVELOPE_RATE`]
    pub fn rate(&self) -> u32 {
        ENVELOPE_RATE
    }

    /// Duration covered by the envelope in seconds
    pub fn duration(&self) -> f64 {
        self.values.len() as f64 / ENVELOPE_RATE as f64
    }

    /// Arithmetic mean of the envelope, 0.0 when empty
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().map(|&v| v as f64).sum::<f64>() / self.values.len() as f64
    }
}

/// Autocorrelation score of the envelope at one lag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPoint {
    /// Shift in envelope samples
    pub lag: usize,

    /// Mean pointwise product of the envelope with its shifted copy
    pub score: f64,
}

impl CorrelationPoint {
    /// Tempo this lag corresponds to at the given envelope rate
    pub fn bpm(&self, envelope_rate: u32) -> f64 {
        60.0 * envelope_rate as f64 / self.lag as f64
    }
}

/// Correlation scores for every evaluated lag, in increasing lag order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationDistribution {
    points: Vec<CorrelationPoint>,
}

impl CorrelationDistribution {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { points: Vec::with_capacity(capacity) }
    }

    pub(crate) fn push(&mut self, point: CorrelationPoint) {
        debug_assert!(self.points.last().map_or(true, |last| last.lag + 1 == point.lag));
        self.points.push(point);
    }

    pub fn points(&self) -> &[CorrelationPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorrelationPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Score recorded for a lag, if that lag was evaluated
    pub fn score_at(&self, lag: usize) -> Option<f64> {
        let first = self.points.first()?.lag;
        let idx = lag.checked_sub(first)?;
        self.points.get(idx).map(|p| p.score)
    }

    /// Mean score over all entries, 0.0 when empty
    pub fn mean_score(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(|p| p.score).sum::<f64>() / self.points.len() as f64
    }

    /// Highest-scoring entry; the smallest lag wins ties
    pub fn peak(&self) -> Option<CorrelationPoint> {
        let mut best: Option<CorrelationPoint> = None;
        for point in &self.points {
            match best {
                Some(b) if point.score <= b.score => {}
                _ => best = Some(*point),
            }
        }
        best
    }
}

/// Outcome of a lag search over one envelope
#[derive(Debug, Clone, PartialEq)]
pub struct Correlation {
    /// Lag with the greatest score, `None` when no lag could be evaluated
    pub best_lag: Option<usize>,

    /// Every evaluated lag with its score
    pub distribution: CorrelationDistribution,
}

impl Correlation {
    /// Score of the winning lag, if any
    pub fn peak_score(&self) -> Option<f64> {
        self.best_lag.and_then(|lag| self.distribution.score_at(lag))
    }
}

/// Final tempo, energy and danceability estimate for one track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TempoReport {
    /// Estimated tempo in beats per minute
    pub bpm: u32,

    /// Overall loudness score (0-100)
    pub energy: u8,

    /// Rhythmic regularity score (0-100)
    pub danceability: u8,
}

impl TempoReport {
    /// Double-time alternate tempo, offered next to the estimate for display
    pub fn double_time_bpm(&self) -> u32 {
        self.bpm.saturating_mul(2)
    }
}

/// Everything the pipeline computed for one waveform
#[derive(Debug, Clone)]
pub struct AnalysisTrace {
    pub envelope: EnergyEnvelope,
    pub correlation: Correlation,
    pub report: Option<TempoReport>,
}

/// Configuration for tempo analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Slowest tempo searched (BPM)
    pub min_bpm: f32,

    /// Fastest tempo searched (BPM)
    pub max_bpm: f32,

    /// Linear calibration from mean envelope RMS to the energy score
    pub energy_scale: f64,

    /// Linear calibration from peak-to-mean correlation ratio to danceability
    pub danceability_scale: f64,

    /// Channel reduction applied to multi-channel audio
    pub channel: ChannelMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_bpm: 60.0,
            max_bpm: 200.0,
            energy_scale: 150.0,
            danceability_scale: 40.0,
            channel: ChannelMode::First,
        }
    }
}

impl AnalysisConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if !self.min_bpm.is_finite() || self.min_bpm <= 0.0 {
            return Err("Minimum BPM must be a positive number".to_string());
        }

        if !self.max_bpm.is_finite() || self.min_bpm >= self.max_bpm {
            return Err("Minimum BPM must be less than maximum BPM".to_string());
        }

        if !self.energy_scale.is_finite() || self.energy_scale <= 0.0 {
            return Err("Energy scale must be a positive number".to_string());
        }

        if !self.danceability_scale.is_finite() || self.danceability_scale <= 0.0 {
            return Err("Danceability scale must be a positive number".to_string());
        }

        Ok(())
    }
}
