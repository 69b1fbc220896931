use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::audio::{AudioData, AudioLoader, TempoAnalyzer};
use crate::batch::types::{BatchProgress, TrackAnalysis, TrackOutcome};
use crate::config::BatchConfig;
use crate::error::{Result, VibeError};

/// Fork-join analysis of many independent tracks.
///
/// Tracks are started `batch_size` at a time; each batch is joined before the
/// refresh callback runs and the next batch starts. A track that fails to
/// load is reported as [`TrackOutcome::Failed`] and never stops the run.
pub struct BatchAnalyzer {
    analyzer: Arc<TempoAnalyzer>,
    config: BatchConfig,
    pool: rayon::ThreadPool,
}

impl BatchAnalyzer {
    pub fn new(analyzer: TempoAnalyzer, config: BatchConfig) -> Result<Self> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_workers)
            .thread_name(|i| format!("vibe-bpm-worker-{}", i))
            .build()
            .map_err(|e| VibeError::generic(format!("failed to start worker pool: {}", e)))?;

        Ok(Self {
            analyzer: Arc::new(analyzer),
            config,
            pool,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Decode and analyze audio files, `max_workers` at a time.
    ///
    /// Results come back in input order. `on_batch` sees the progress and the
    /// results of each batch once all of its tracks are done.
    pub async fn analyze_files<F>(&self, paths: Vec<PathBuf>, mut on_batch: F) -> Vec<TrackAnalysis>
    where
        F: FnMut(&BatchProgress, &[TrackAnalysis]),
    {
        let total = paths.len();
        let batch_count = self.batch_count(total);
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let mut results = Vec::with_capacity(total);

        info!(
            "Analyzing {} files in {} batches of up to {}",
            total, batch_count, self.config.batch_size
        );

        for (batch_index, chunk) in paths.chunks(self.config.batch_size).enumerate() {
            let mut slots: Vec<Option<TrackAnalysis>> = vec![None; chunk.len()];
            let mut tasks = JoinSet::new();

            for (slot, path) in chunk.iter().cloned().enumerate() {
                let analyzer = Arc::clone(&self.analyzer);
                let semaphore = Arc::clone(&semaphore);

                tasks.spawn(async move {
                    let source = path.display().to_string();
                    let _permit = semaphore.acquire_owned().await;

                    let outcome =
                        tokio::task::spawn_blocking(move || analyze_file(&analyzer, &path))
                            .await
                            .unwrap_or_else(|e| {
                                TrackOutcome::failed(format!("analysis task failed: {}", e))
                            });

                    (slot, TrackAnalysis { source, outcome })
                });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((slot, track)) => slots[slot] = Some(track),
                    Err(e) => warn!("Batch task did not complete: {}", e),
                }
            }

            let batch: Vec<TrackAnalysis> = slots
                .into_iter()
                .zip(chunk)
                .map(|(track, path)| {
                    track.unwrap_or_else(|| TrackAnalysis {
                        source: path.display().to_string(),
                        outcome: TrackOutcome::failed("analysis task aborted"),
                    })
                })
                .collect();

            results.extend(batch);
            self.finish_batch(batch_index, batch_count, &results, total, &mut on_batch);
        }

        results
    }

    /// Analyze already-decoded tracks on the worker pool.
    ///
    /// Same batching and callback contract as [`analyze_files`](Self::analyze_files),
    /// without an async runtime.
    pub fn analyze_tracks<F>(&self, tracks: Vec<AudioData>, mut on_batch: F) -> Vec<TrackAnalysis>
    where
        F: FnMut(&BatchProgress, &[TrackAnalysis]),
    {
        let total = tracks.len();
        let batch_count = self.batch_count(total);
        let mut results = Vec::with_capacity(total);

        for (batch_index, chunk) in tracks.chunks(self.config.batch_size).enumerate() {
            let analyzer = &self.analyzer;
            let batch: Vec<TrackAnalysis> = self.pool.install(|| {
                chunk
                    .par_iter()
                    .map(|audio| TrackAnalysis {
                        source: audio.source.clone(),
                        outcome: TrackOutcome::from_report(analyzer.analyze_audio(audio)),
                    })
                    .collect()
            });

            results.extend(batch);
            self.finish_batch(batch_index, batch_count, &results, total, &mut on_batch);
        }

        results
    }

    fn batch_count(&self, total: usize) -> usize {
        (total + self.config.batch_size - 1) / self.config.batch_size
    }

    fn finish_batch<F>(
        &self,
        batch_index: usize,
        batch_count: usize,
        results: &[TrackAnalysis],
        total: usize,
        on_batch: &mut F,
    ) where
        F: FnMut(&BatchProgress, &[TrackAnalysis]),
    {
        let start = batch_index * self.config.batch_size;
        let progress = BatchProgress {
            batch_index,
            batch_count,
            completed: results.len(),
            total,
        };

        debug!(
            "Batch {}/{} done ({}/{} tracks)",
            batch_index + 1,
            batch_count,
            progress.completed,
            total
        );
        on_batch(&progress, &results[start..]);
    }
}

fn analyze_file(analyzer: &TempoAnalyzer, path: &std::path::Path) -> TrackOutcome {
    match AudioLoader::load(path) {
        Ok(audio) => TrackOutcome::from_report(analyzer.analyze_audio(&audio)),
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            TrackOutcome::failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{synth, TempoReport};
    use std::fs::File;
    use std::path::Path;
    use tempfile::tempdir;

    fn batch_analyzer(batch_size: usize, max_workers: usize) -> BatchAnalyzer {
        BatchAnalyzer::new(TempoAnalyzer::new(), BatchConfig { batch_size, max_workers }).unwrap()
    }

    fn write_clicks(path: &Path, bpm: f64, beats: usize) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut wav = hound::WavWriter::new(File::create(path).unwrap(), spec).unwrap();
        for s in synth::click_train(bpm, 44100, beats) {
            wav.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
        wav.finalize().unwrap();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BatchConfig { batch_size: 0, max_workers: 2 };
        let result = BatchAnalyzer::new(TempoAnalyzer::new(), config);
        assert!(result.is_err());
    }

    #[test]
    fn test_tracks_in_order_with_callbacks() {
        let tracks: Vec<AudioData> = (0..5)
            .map(|i| {
                let samples = if i == 3 {
                    vec![0.2; 1000]
                } else {
                    synth::click_train(120.0, 44100, 20)
                };
                AudioData::from_mono(samples, 44100, format!("track-{}", i))
            })
            .collect();

        let mut seen = Vec::new();
        let results = batch_analyzer(2, 2).analyze_tracks(tracks, |progress, batch| {
            seen.push((*progress, batch.len()));
        });

        let sources: Vec<&str> = results.iter().map(|t| t.source.as_str()).collect();
        assert_eq!(sources, ["track-0", "track-1", "track-2", "track-3", "track-4"]);
        assert_eq!(results[3].outcome, TrackOutcome::NoResult);
        assert_eq!(results[0].report().map(|r| r.bpm), Some(120));

        assert_eq!(seen.len(), 3);
        let first = BatchProgress { batch_index: 0, batch_count: 3, completed: 2, total: 5 };
        let last = BatchProgress { batch_index: 2, batch_count: 3, completed: 5, total: 5 };
        assert_eq!(seen[0], (first, 2));
        assert_eq!(seen[2], (last, 1));
        assert!(seen[2].0.is_last());
    }

    #[test]
    fn test_batch_results_match_single_calls() {
        let tracks: Vec<AudioData> = [60.0, 120.0, 200.0]
            .iter()
            .map(|&bpm| {
                let samples = synth::click_train(bpm, 44100, 12);
                AudioData::from_mono(samples, 44100, format!("{}", bpm))
            })
            .collect();
        let expected: Vec<Option<TempoReport>> =
            tracks.iter().map(|t| TempoAnalyzer::new().analyze_audio(t)).collect();

        let results = batch_analyzer(7, 4).analyze_tracks(tracks, |_, _| {});
        let got: Vec<Option<TempoReport>> = results.iter().map(|t| t.report().copied()).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_empty_input() {
        let mut calls = 0;
        let results = batch_analyzer(7, 2).analyze_tracks(Vec::new(), |_, _| calls += 1);
        assert!(results.is_empty());
        assert_eq!(calls, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_files_with_failures_do_not_abort() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.wav");
        let missing = dir.path().join("missing.wav");
        let unsupported = dir.path().join("notes.txt");
        write_clicks(&good, 120.0, 20);
        std::fs::write(&unsupported, b"not audio").unwrap();

        let mut batches = 0;
        let results = batch_analyzer(2, 2)
            .analyze_files(vec![good.clone(), missing, unsupported, good], |progress, _| {
                batches += 1;
                assert_eq!(progress.batch_count, 2);
            })
            .await;

        assert_eq!(batches, 2);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].report().map(|r| r.bpm), Some(120));
        assert!(matches!(results[1].outcome, TrackOutcome::Failed { .. }));
        assert!(matches!(results[2].outcome, TrackOutcome::Failed { .. }));
        assert_eq!(results[3].outcome, results[0].outcome);
        assert!(results[1].source.ends_with("missing.wav"));
    }
}
