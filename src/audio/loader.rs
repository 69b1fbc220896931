use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::types::{AudioData, AudioFormat};
use crate::error::{AudioError, Result};

/// Extensions decoded through symphonia rather than hound
const SYMPHONIA_FORMATS: &[&str] = &["mp3", "flac", "ogg", "m4a", "aac"];

/// Decodes audio files and in-memory buffers into PCM [`AudioData`]
pub struct AudioLoader;

impl AudioLoader {
    /// Load an audio file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<AudioData> {
        let path = path.as_ref();
        let extension = Self::detect_format(path).unwrap_or_default();

        match extension.as_str() {
            "wav" => Self::load_wav(path),
            ext if SYMPHONIA_FORMATS.contains(&ext) => Self::load_with_symphonia(path, ext),
            _ => Err(AudioError::UnsupportedFormat { format: extension }.into()),
        }
    }

    /// Decode a complete encoded file held in memory, e.g. a downloaded preview.
    ///
    /// `extension_hint` only helps the format probe; the container is
    /// detected from the bytes themselves.
    pub fn decode_bytes<S: Into<String>>(
        bytes: Vec<u8>,
        extension_hint: Option<&str>,
        source: S,
    ) -> Result<AudioData> {
        let source = source.into();
        if bytes.is_empty() {
            return Err(AudioError::DecodeFailed {
                source_name: source,
                reason: "empty buffer".to_string(),
            }
            .into());
        }

        Self::decode_stream(Box::new(Cursor::new(bytes)), extension_hint, source)
    }

    /// Load WAV files using the hound crate
    fn load_wav(path: &Path) -> Result<AudioData> {
        let load_failed = || AudioError::LoadFailed { path: path.display().to_string() };

        let reader = hound::WavReader::open(path).map_err(|_| load_failed())?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| load_failed())?,
            hound::SampleFormat::Int => reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| Self::int_to_float(v, spec.bits_per_sample)))
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| load_failed())?,
        };

        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(AudioError::InvalidParameters {
                details: format!("{} channels at {} Hz", spec.channels, spec.sample_rate),
            }
            .into());
        }

        let frames = samples.len() / spec.channels as usize;
        tracing::info!(
            "Loaded {}: {} frames, {} Hz, {} channels",
            path.display(),
            frames,
            spec.sample_rate,
            spec.channels
        );

        Ok(AudioData {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            duration: frames as f64 / spec.sample_rate as f64,
            source: path.display().to_string(),
            format: AudioFormat {
                extension: "wav".to_string(),
                bit_depth: Some(spec.bits_per_sample),
                compression: None,
            },
        })
    }

    fn load_with_symphonia(path: &Path, extension: &str) -> Result<AudioData> {
        let file = File::open(path).map_err(|_| AudioError::LoadFailed {
            path: path.display().to_string(),
        })?;

        let source = path.display().to_string();
        let audio = Self::decode_stream(Box::new(file), Some(extension), source)?;
        tracing::info!(
            "Loaded {}: {:.1}s, {} Hz, {} channels",
            audio.source,
            audio.duration,
            audio.sample_rate,
            audio.channels
        );
        Ok(audio)
    }

    /// Probe, demux and decode the first audio track of a media source
    fn decode_stream(
        source: Box<dyn MediaSource>,
        extension_hint: Option<&str>,
        source_name: String,
    ) -> Result<AudioData> {
        let decode_failed = |reason: String| AudioError::DecodeFailed {
            source_name: source_name.clone(),
            reason,
        };

        let mss = MediaSourceStream::new(source, Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension_hint {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| decode_failed(e.to_string()))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| decode_failed("no decodable audio track".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();
        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| decode_failed(e.to_string()))?;

        let mut sample_rate = codec_params.sample_rate;
        let mut channels = codec_params.channels.map(|c| c.count() as u16);
        let mut buffer: Option<SampleBuffer<f32>> = None;
        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                // End of stream
                Err(SymphoniaError::IoError(_)) => break,
                Err(e) => return Err(decode_failed(e.to_string()).into()),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate.get_or_insert(spec.rate);
                    channels.get_or_insert(spec.channels.count() as u16);

                    let buf = buffer.get_or_insert_with(|| {
                        SampleBuffer::<f32>::new(decoded.capacity() as u64, spec)
                    });
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!("Skipping corrupt packet in {}: {}", source_name, e);
                }
                Err(SymphoniaError::IoError(_)) => break,
                Err(e) => return Err(decode_failed(e.to_string()).into()),
            }
        }

        let sample_rate = sample_rate
            .filter(|&r| r > 0)
            .ok_or_else(|| AudioError::InvalidParameters {
                details: "No sample rate found".to_string(),
            })?;
        let channels = channels
            .filter(|&c| c > 0)
            .ok_or_else(|| AudioError::InvalidParameters {
                details: "No channel information found".to_string(),
            })?;

        let frames = samples.len() / channels as usize;

        Ok(AudioData {
            samples,
            sample_rate,
            channels,
            duration: frames as f64 / sample_rate as f64,
            format: AudioFormat {
                extension: extension_hint.unwrap_or("unknown").to_lowercase(),
                bit_depth: codec_params.bits_per_sample.map(|b| b as u16),
                compression: Some(format!("{:?}", codec_params.codec)),
            },
            source: source_name,
        })
    }

    /// Convert a signed integer sample of the given bit depth to [-1.0, 1.0).
    ///
    /// hound hands out every integer width (8-bit included) already signed.
    fn int_to_float(sample: i32, bit_depth: u16) -> f32 {
        let bits = if (1..=32).contains(&bit_depth) { bit_depth } else { 16 };
        sample as f32 / (1u64 << (bits - 1)) as f32
    }

    /// Detect audio format from file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if a file format is supported
    pub fn is_format_supported(extension: &str) -> bool {
        let ext = extension.to_lowercase();
        ext == "wav" || SYMPHONIA_FORMATS.contains(&ext.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{analyzer::analyze, synth};
    use crate::error::VibeError;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_wav_i16<W: std::io::Write + std::io::Seek>(writer: W, samples: &[f32], channels: u16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut wav = hound::WavWriter::new(writer, spec).unwrap();
        for &s in samples {
            wav.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
        wav.finalize().unwrap();
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(AudioLoader::detect_format("test.wav"), Some("wav".to_string()));
        assert_eq!(AudioLoader::detect_format("test.MP3"), Some("mp3".to_string()));
        assert_eq!(AudioLoader::detect_format("test"), None);
    }

    #[test]
    fn test_format_support() {
        assert!(AudioLoader::is_format_supported("wav"));
        assert!(AudioLoader::is_format_supported("mp3"));
        assert!(AudioLoader::is_format_supported("FLAC"));
        assert!(!AudioLoader::is_format_supported("xyz"));
    }

    #[test]
    fn test_int_to_float_conversion() {
        assert_eq!(AudioLoader::int_to_float(0, 16), 0.0);
        assert_eq!(AudioLoader::int_to_float(-32768, 16), -1.0);
        assert_eq!(AudioLoader::int_to_float(16384, 16), 0.5);
        assert_eq!(AudioLoader::int_to_float(-128, 8), -1.0);
        assert_eq!(AudioLoader::int_to_float(64, 8), 0.5);
        assert_eq!(AudioLoader::int_to_float(-8388608, 24), -1.0);
        assert_eq!(AudioLoader::int_to_float(100, 0), 100.0 / 32768.0);
    }

    #[test]
    fn test_unsupported_format() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test.xyz");
        File::create(&file_path).unwrap().write_all(b"dummy content").unwrap();

        match AudioLoader::load(&file_path) {
            Err(VibeError::Audio(AudioError::UnsupportedFormat { format })) => {
                assert_eq!(format, "xyz")
            }
            other => panic!("Expected UnsupportedFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_wav_fails_to_load() {
        let temp_dir = tempdir().unwrap();
        let result = AudioLoader::load(temp_dir.path().join("missing.wav"));
        assert!(matches!(result, Err(VibeError::Audio(AudioError::LoadFailed { .. }))));
    }

    #[test]
    fn test_wav_file_analysis() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("clicks.wav");
        let clicks = synth::click_train(120.0, 44100, 20);
        write_wav_i16(File::create(&file_path).unwrap(), &clicks, 1);

        let audio = AudioLoader::load(&file_path).unwrap();
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.samples.len(), clicks.len());
        assert_eq!(audio.format.bit_depth, Some(16));

        let report = analyze(&audio.samples, audio.sample_rate).unwrap();
        assert_eq!(report.bpm, 120);
    }

    #[test]
    fn test_stereo_float_wav() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut wav = hound::WavWriter::create(&file_path, spec).unwrap();
        for i in 0..22050 {
            wav.write_sample(0.25f32).unwrap();
            wav.write_sample(if i % 2 == 0 { -0.5f32 } else { 0.5 }).unwrap();
        }
        wav.finalize().unwrap();

        let audio = AudioLoader::load(&file_path).unwrap();
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.duration, 1.0);
        assert!(audio.channel_samples(0).iter().all(|&s| s == 0.25));
    }

    #[test]
    fn test_decode_bytes() {
        let clicks = synth::click_train(120.0, 44100, 20);
        let mut cursor = Cursor::new(Vec::new());
        write_wav_i16(&mut cursor, &clicks, 1);

        let audio = AudioLoader::decode_bytes(cursor.into_inner(), Some("wav"), "preview").unwrap();
        assert_eq!(audio.source, "preview");
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.channels, 1);

        let report = analyze(&audio.samples, audio.sample_rate).unwrap();
        assert_eq!(report.bpm, 120);
    }

    #[test]
    fn test_decode_garbage_bytes() {
        let result = AudioLoader::decode_bytes(b"definitely not audio".to_vec(), None, "junk");
        assert!(matches!(result, Err(VibeError::Audio(AudioError::DecodeFailed { .. }))));

        let result = AudioLoader::decode_bytes(Vec::new(), Some("mp3"), "empty");
        assert!(matches!(result, Err(VibeError::Audio(AudioError::DecodeFailed { .. }))));
    }
}
