//! Microphone-backed capture device.
//!
//! Captures PCM from a cpal input device, converts multi-channel audio to
//! mono by averaging channels, and feeds three consumers: the preview level
//! meter, the per-span chunk queue for artifact assembly, and the span
//! buffer tapped by the live transcriber.

use crate::capture::device::{AnswerRecorder, AudioChunk, CaptureDevice, InputStream};
use crate::transcription::live::AudioTap;
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Preview window kept for level metering (~50ms at 16kHz).
const PREVIEW_SAMPLES: usize = 800;

/// State shared between the cpal callback and the stream/recorder/tap handles.
#[derive(Debug)]
struct SharedCapture {
    /// Capture gate: samples are only accumulated while a span is active
    recording: AtomicBool,
    /// All samples of the current recording span, in order
    span: Mutex<Vec<i16>>,
    /// Chunks not yet drained by the recorder, in arrival order
    chunks: Mutex<Vec<AudioChunk>>,
    /// Most recent samples for the preview meter
    preview: Mutex<Vec<i16>>,
}

impl SharedCapture {
    fn new() -> Self {
        Self {
            recording: AtomicBool::new(false),
            span: Mutex::new(Vec::new()),
            chunks: Mutex::new(Vec::new()),
            preview: Mutex::new(Vec::new()),
        }
    }

    fn ingest(&self, mono: Vec<i16>) {
        {
            let mut preview = self.preview.lock().unwrap();
            preview.extend_from_slice(&mono);
            let len = preview.len();
            if len > PREVIEW_SAMPLES {
                preview.drain(..len - PREVIEW_SAMPLES);
            }
        }

        if self.recording.load(Ordering::Relaxed) {
            self.span.lock().unwrap().extend_from_slice(&mono);
            self.chunks.lock().unwrap().push(AudioChunk { samples: mono });
        }
    }
}

/// Microphone capture device configured from `terview.toml`.
pub struct MicDevice {
    device_name: String,
    requested_sample_rate: u32,
    reference_level_db: i8,
}

impl MicDevice {
    pub fn new(device_name: String, requested_sample_rate: u32, reference_level_db: i8) -> Self {
        Self {
            device_name,
            requested_sample_rate,
            reference_level_db,
        }
    }

    /// Opens the configured input device and starts the capture stream.
    ///
    /// The stream runs from here until `release()`; recording spans only
    /// gate whether samples are accumulated.
    ///
    /// # Errors
    /// - If the specified device is not available
    /// - If device configuration fails
    /// - If audio stream creation fails
    pub fn open(&self) -> Result<MicStream> {
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            if self.device_name == "default" {
                host.default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available"))
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })?;

        let device_label = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Capture device: {}", device_label);

        let device_config = device.default_input_config()?;
        let sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        if sample_rate != self.requested_sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Capturing at device rate.",
                self.requested_sample_rate,
                sample_rate
            );
        }

        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            sample_rate,
            num_channels
        );

        let shared = Arc::new(SharedCapture::new());
        let callback_shared = Arc::clone(&shared);

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                callback_shared.ingest(downmix_to_mono(data, num_channels));
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        tracing::debug!("Audio stream started");

        Ok(MicStream {
            shared,
            stream: Some(stream),
            sample_rate,
            reference_level_db: self.reference_level_db,
        })
    }
}

impl CaptureDevice for MicDevice {
    fn request_access(&mut self) -> Result<Box<dyn InputStream>> {
        Ok(Box::new(self.open()?))
    }
}

/// A live microphone stream: preview metering plus recorder spans.
pub struct MicStream {
    shared: Arc<SharedCapture>,
    stream: Option<cpal::Stream>,
    sample_rate: u32,
    reference_level_db: i8,
}

impl MicStream {
    /// Read-only tap over the current recording span, for the live transcriber.
    pub fn span_tap(&self) -> SpanTap {
        SpanTap {
            shared: Arc::clone(&self.shared),
            sample_rate: self.sample_rate,
        }
    }
}

impl InputStream for MicStream {
    fn preview_level(&self) -> u8 {
        let preview = self.shared.preview.lock().unwrap();
        level_percent(&preview, self.reference_level_db)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn start_recording(&mut self) -> Result<Box<dyn AnswerRecorder>> {
        if self.stream.is_none() {
            return Err(anyhow!("Capture stream has been released"));
        }
        if self.shared.recording.swap(true, Ordering::SeqCst) {
            return Err(anyhow!("A recording span is already active"));
        }
        self.shared.span.lock().unwrap().clear();
        self.shared.chunks.lock().unwrap().clear();
        tracing::debug!("Recording span started");
        Ok(Box::new(MicRecorder {
            shared: Arc::clone(&self.shared),
        }))
    }

    fn release(&mut self) {
        self.shared.recording.store(false, Ordering::SeqCst);
        if self.stream.take().is_some() {
            tracing::debug!("Capture stream released");
        }
    }
}

impl Drop for MicStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// One active recording span on a microphone stream.
struct MicRecorder {
    shared: Arc<SharedCapture>,
}

impl AnswerRecorder for MicRecorder {
    fn poll_chunks(&mut self) -> Vec<AudioChunk> {
        std::mem::take(&mut *self.shared.chunks.lock().unwrap())
    }

    fn stop(&mut self) -> Result<Vec<AudioChunk>> {
        self.shared.recording.store(false, Ordering::SeqCst);
        let remaining = std::mem::take(&mut *self.shared.chunks.lock().unwrap());
        let span_len = self.shared.span.lock().unwrap().len();
        tracing::debug!("Recording span stopped ({span_len} samples)");
        Ok(remaining)
    }
}

/// Snapshot access to the samples of the current recording span.
pub struct SpanTap {
    shared: Arc<SharedCapture>,
    sample_rate: u32,
}

impl AudioTap for SpanTap {
    fn snapshot(&self) -> (Vec<i16>, u32) {
        (self.shared.span.lock().unwrap().clone(), self.sample_rate)
    }
}

/// Converts interleaved multi-channel PCM to mono by averaging channels.
fn downmix_to_mono(data: &[i16], num_channels: usize) -> Vec<i16> {
    match num_channels {
        0 | 1 => data.to_vec(),
        2 => data
            .chunks_exact(2)
            .map(|pair| ((pair[0] as i32 + pair[1] as i32) / 2) as i16)
            .collect(),
        n => data
            .chunks_exact(n)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / n as i32) as i16
            })
            .collect(),
    }
}

/// Converts recent samples to a 0-100 level for the preview meter.
///
/// RMS is converted to dBFS and normalized against the configured reference
/// level over a 40dB display range.
pub fn level_percent(samples: &[i16], reference_level_db: i8) -> u8 {
    if samples.is_empty() {
        return 0;
    }

    let sum_of_squares: i64 = samples.iter().map(|&x| (x as i64).pow(2)).sum();
    let mean_square = sum_of_squares / samples.len() as i64;
    let rms = (mean_square as f32).sqrt();

    let db_fs = if rms > 0.0 {
        20.0 * (rms / 32767.0).log10()
    } else {
        -160.0
    };

    let min_db = reference_level_db as f32 - 40.0;
    ((db_fs - min_db) / 40.0 * 100.0).clamp(0.0, 100.0) as u8
}

/// Finds an audio input device by name or numeric index.
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();

        if index < devices.len() {
            return Ok(devices.into_iter().nth(index).unwrap());
        } else {
            return Err(anyhow!(
                "Device index {} is out of range (0-{})",
                index,
                devices.len().saturating_sub(1)
            ));
        }
    }

    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'terview list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_stereo_pairs() {
        assert_eq!(downmix_to_mono(&[100, 200, -50, 50], 2), vec![150, 0]);
    }

    #[test]
    fn downmix_passes_mono_through() {
        assert_eq!(downmix_to_mono(&[1, 2, 3], 1), vec![1, 2, 3]);
    }

    #[test]
    fn level_is_zero_for_silence_and_empty_input() {
        assert_eq!(level_percent(&[], -20), 0);
        assert_eq!(level_percent(&[0; 512], -20), 0);
    }

    #[test]
    fn level_increases_with_amplitude() {
        let quiet = level_percent(&[500; 512], -20);
        let loud = level_percent(&[20000; 512], -20);
        assert!(loud > quiet);
        assert!(loud <= 100);
    }
}
