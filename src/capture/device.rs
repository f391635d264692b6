//! Device capture seam for answer recording.
//!
//! The capture state machine depends only on these traits, never on a
//! concrete audio API. The microphone implementation lives in `capture::mic`;
//! tests drive the state machine with deterministic fakes.

use anyhow::anyhow;
use std::io::Cursor;

/// An ordered chunk of captured PCM audio (mono i16 samples).
///
/// Chunks arrive in capture order and must be assembled in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub samples: Vec<i16>,
}

/// The assembled recording produced at the end of a spoken-question capture.
///
/// Immutable once assembled; the WAV bytes are kept in memory for the
/// remainder of the session (playback on review, results display).
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub wav_bytes: Vec<u8>,
    pub sample_rate: u32,
    pub duration_seconds: f32,
}

/// Access to the capture hardware. `request_access` either yields a live
/// stream or a failure the caller surfaces as a retryable condition.
pub trait CaptureDevice {
    fn request_access(&mut self) -> anyhow::Result<Box<dyn InputStream>>;
}

/// A granted input stream. Alive from access grant until `release()`;
/// provides the live preview level and starts recorders.
///
/// Releasing the stream stops the underlying hardware capture. This is a
/// hard requirement: the device is an exclusive resource shared with the
/// rest of the system.
pub trait InputStream {
    /// Current input level for the live preview, 0-100.
    fn preview_level(&self) -> u8;

    /// Sample rate the stream actually captures at.
    fn sample_rate(&self) -> u32;

    /// Begins accumulating chunks for one recording span.
    fn start_recording(&mut self) -> anyhow::Result<Box<dyn AnswerRecorder>>;

    /// Stops the underlying capture and releases the device.
    fn release(&mut self);
}

/// One recording span in progress. Chunks are drained in arrival order;
/// `stop()` ends the span and performs the final drain.
pub trait AnswerRecorder {
    /// Drains chunks that arrived since the last poll.
    fn poll_chunks(&mut self) -> Vec<AudioChunk>;

    /// Stops capturing and drains any remaining chunks.
    fn stop(&mut self) -> anyhow::Result<Vec<AudioChunk>>;
}

/// Assembles ordered chunks into an immutable in-memory WAV artifact.
///
/// Must only be called after capture has fully stopped; the chunk list is
/// the complete span in arrival order. An empty capture (stop before the
/// first chunk arrived) assembles to a valid zero-duration artifact.
///
/// # Errors
/// - If WAV encoding fails
pub fn assemble_artifact(chunks: &[AudioChunk], sample_rate: u32) -> anyhow::Result<Artifact> {
    if sample_rate == 0 {
        return Err(anyhow!("Invalid sample rate"));
    }
    let sample_count: usize = chunks.iter().map(|c| c.samples.len()).sum();

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for chunk in chunks {
            for &sample in &chunk.samples {
                writer.write_sample(sample)?;
            }
        }
        writer.finalize()?;
    }

    let duration_seconds = sample_count as f32 / sample_rate as f32;
    tracing::debug!(
        "Assembled artifact: {:.2}s ({} samples at {}Hz)",
        duration_seconds,
        sample_count,
        sample_rate
    );

    Ok(Artifact {
        wav_bytes: cursor.into_inner(),
        sample_rate,
        duration_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_chunks_in_arrival_order() {
        let chunks = vec![
            AudioChunk { samples: vec![1, 2] },
            AudioChunk { samples: vec![3] },
            AudioChunk { samples: vec![4, 5] },
        ];
        let artifact = assemble_artifact(&chunks, 16000).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(&artifact.wav_bytes)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![1, 2, 3, 4, 5]);
        assert_eq!(artifact.sample_rate, 16000);
    }

    #[test]
    fn empty_capture_assembles_to_zero_duration() {
        let artifact = assemble_artifact(&[], 16000).unwrap();
        assert_eq!(artifact.duration_seconds, 0.0);

        let mut reader = hound::WavReader::new(Cursor::new(&artifact.wav_bytes)).unwrap();
        assert_eq!(reader.samples::<i16>().count(), 0);
    }

    #[test]
    fn rejects_invalid_sample_rate() {
        assert!(assemble_artifact(&[], 0).is_err());
    }
}
