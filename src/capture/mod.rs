//! Per-question capture: countdown timing, device seam, transcript seam,
//! and the spoken/written capture state machines.

pub mod device;
pub mod mic;
pub mod session;
pub mod timer;
pub mod transcript;

pub use device::{assemble_artifact, AnswerRecorder, Artifact, AudioChunk, CaptureDevice, InputStream};
pub use mic::MicDevice;
pub use session::{RecordedAnswer, SpokenCapture, SpokenStep, WrittenAnswer, WrittenCapture, WrittenStep};
pub use timer::{Countdown, TimerTick};
pub use transcript::{NullTranscriptFeed, TranscriptFeed};
