//! Synthetic test signals.
//!
//! Used by the unit tests, the benchmark and the `click-track` binary to
//! produce audio with a known tempo.

use std::f32::consts::PI;

/// Length of one click burst in seconds
const CLICK_SECONDS: f64 = 0.002;

/// Peak amplitude of a click
const CLICK_AMPLITUDE: f32 = 0.9;

/// Mono click train at `bpm` holding exactly `beats` clicks.
///
/// Clicks start half a period in and the signal ends a quarter period after
/// the last beat interval, so the beat period scores strictly above its
/// multiples in a mean-normalized autocorrelation. Each click is a short
/// linearly decaying burst; everything between clicks is exact silence.
///
/// A train that starts on sample 0 and stops right after its last period
/// ties the beat lag with every multiple of it, and float rounding picks the
/// winner: a plain 30 s train at 120 BPM can read as 60.
pub fn click_train(bpm: f64, sample_rate: u32, beats: usize) -> Vec<f32> {
    if bpm <= 0.0 || sample_rate == 0 {
        return Vec::new();
    }

    let period = 60.0 * sample_rate as f64 / bpm;
    let len = (beats as f64 * period + period / 4.0).floor() as usize;
    let burst_len = ((CLICK_SECONDS * sample_rate as f64) as usize).max(1);

    let burst: Vec<f32> = (0..burst_len)
        .map(|i| CLICK_AMPLITUDE * (1.0 - i as f32 / burst_len as f32))
        .collect();

    let mut samples = vec![0.0f32; len];
    for beat in 0..beats {
        let start = (period / 2.0 + beat as f64 * period).round() as usize;
        let end = (start + burst_len).min(len);
        if start >= end {
            break;
        }
        samples[start..end].copy_from_slice(&burst[..end - start]);
    }

    samples
}

/// Constant-amplitude sine tone
pub fn sine(frequency: f32, sample_rate: u32, seconds: f64, amplitude: f32) -> Vec<f32> {
    let len = (seconds * sample_rate as f64) as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * PI * frequency * t).sin() * amplitude
        })
        .collect()
}
