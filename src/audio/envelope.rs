use crate::audio::types::{EnergyEnvelope, ENVELOPE_RATE};

/// Reduces a PCM waveform to a 100 Hz RMS energy envelope.
///
/// Working at envelope rate keeps the lag search cheap and makes it track
/// rhythm-scale periodicity instead of pitch.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyEnvelopeBuilder;

impl EnergyEnvelopeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Number of input samples folded into one envelope value.
    ///
    /// Sample rates below [`ENVELOPE_RATE`] (including 0) degrade to one
    /// sample per window.
    pub fn window_size(sample_rate: u32) -> usize {
        ((sample_rate / ENVELOPE_RATE) as usize).max(1)
    }

    /// Compute the RMS of each consecutive, non-overlapping 10 ms window.
    ///
    /// The last window may be shorter; it is averaged over its own length.
    pub fn build(&self, samples: &[f32], sample_rate: u32) -> EnergyEnvelope {
        let window = Self::window_size(sample_rate);

        let values = samples
            .chunks(window)
            .map(|chunk| {
                let power = chunk.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>();
                (power / chunk.len() as f64).sqrt() as f32
            })
            .collect();

        let envelope = EnergyEnvelope::from_values(values);
        tracing::debug!(
            "Energy envelope: {} samples @ {} Hz -> {} values, {:.2}s (window {})",
            samples.len(),
            sample_rate,
            envelope.len(),
            envelope.duration(),
            window
        );
        envelope
    }
}
