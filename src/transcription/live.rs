//! Live transcription of an in-progress recording.
//!
//! `LiveTranscriber` implements the transcript-feed contract by periodically
//! re-transcribing everything captured so far in the current recording span
//! and replacing the whole transcript with the result. Full-replace updates
//! mean revisions of earlier text are absorbed naturally; the state machine
//! only ever holds the latest value.
//!
//! Transcription failures degrade: the feed logs, flips to "not listening,"
//! and keeps the last transcript. Recording continues independently.

use crate::capture::transcript::TranscriptFeed;
use crate::transcription::api;
use crate::transcription::model::TranscriptionModel;
use anyhow::Result;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Snapshot access to the audio captured so far in the current span.
pub trait AudioTap: Send + Sync {
    /// Returns all span samples captured so far and their sample rate.
    fn snapshot(&self) -> (Vec<i16>, u32);
}

#[derive(Debug, Default)]
struct FeedShared {
    transcript: Mutex<String>,
    listening: AtomicBool,
    stop_requested: AtomicBool,
    /// Span generation; a worker only publishes for the span it was started for
    generation: AtomicU64,
}

/// API-backed transcript feed for recording spans.
pub struct LiveTranscriber {
    model: TranscriptionModel,
    api_key: String,
    cadence: Duration,
    tap: Arc<dyn AudioTap>,
    shared: Arc<FeedShared>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl LiveTranscriber {
    pub fn new(
        model: TranscriptionModel,
        api_key: String,
        cadence_seconds: u64,
        tap: Arc<dyn AudioTap>,
    ) -> Self {
        Self {
            model,
            api_key,
            cadence: Duration::from_secs(cadence_seconds.max(1)),
            tap,
            shared: Arc::new(FeedShared::default()),
            task: None,
        }
    }

    fn spawn_worker(&mut self) {
        let shared = Arc::clone(&self.shared);
        let tap = Arc::clone(&self.tap);
        let model = self.model;
        let api_key = self.api_key.clone();
        let cadence = self.cadence;
        let my_generation = shared.generation.load(Ordering::SeqCst);

        self.task = Some(tokio::spawn(async move {
            loop {
                // Sleep in short slices so a stop request triggers the final
                // pass promptly instead of waiting out the cadence.
                let mut slept = Duration::ZERO;
                while slept < cadence && !shared.stop_requested.load(Ordering::SeqCst) {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    slept += Duration::from_millis(100);
                }

                if shared.generation.load(Ordering::SeqCst) != my_generation {
                    return;
                }
                let stopping = shared.stop_requested.load(Ordering::SeqCst);

                let (samples, sample_rate) = tap.snapshot();
                if !samples.is_empty() {
                    let result = match encode_wav(&samples, sample_rate) {
                        Ok(wav) => api::transcribe(model, &api_key, wav).await,
                        Err(e) => Err(e),
                    };

                    if shared.generation.load(Ordering::SeqCst) != my_generation {
                        return;
                    }

                    match result {
                        Ok(text) => {
                            *shared.transcript.lock().unwrap() = text;
                        }
                        Err(e) => {
                            tracing::warn!("Live transcription pass failed: {e}");
                            shared.listening.store(false, Ordering::SeqCst);
                            return;
                        }
                    }
                }

                if stopping {
                    shared.listening.store(false, Ordering::SeqCst);
                    return;
                }
            }
        }));
    }
}

impl TranscriptFeed for LiveTranscriber {
    fn is_supported(&self) -> bool {
        true
    }

    fn start(&mut self) {
        // Invalidate any worker still finishing a previous span
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.stop_requested.store(false, Ordering::SeqCst);
        self.shared.transcript.lock().unwrap().clear();
        self.shared.listening.store(true, Ordering::SeqCst);
        self.spawn_worker();
        tracing::debug!(
            "Live transcription started ({}, every {:?})",
            self.model.id(),
            self.cadence
        );
    }

    fn stop(&mut self) {
        // The worker performs one final pass over the full span, publishes,
        // and exits. Dropping the handle detaches rather than aborts.
        self.shared.stop_requested.store(true, Ordering::SeqCst);
        self.shared.listening.store(false, Ordering::SeqCst);
        self.task = None;
        tracing::debug!("Live transcription stop requested");
    }

    fn is_listening(&self) -> bool {
        self.shared.listening.load(Ordering::SeqCst)
    }

    fn latest(&self) -> String {
        self.shared.transcript.lock().unwrap().clone()
    }
}

impl Drop for LiveTranscriber {
    fn drop(&mut self) {
        // Tear down a worker that never got a stop (e.g. quitting mid-recording)
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.listening.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Encodes mono i16 samples as an in-memory WAV for upload.
fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_wav_round_trips_samples() {
        let wav = encode_wav(&[10, -10, 300], 16000).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(&wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.spec().channels, 1);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![10, -10, 300]);
    }
}
