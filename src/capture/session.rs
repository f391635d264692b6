//! Per-question capture state machines.
//!
//! A spoken question runs `Prep -> Recording -> Review`: preparation under a
//! countdown, recording with chunked capture and a live transcript, then
//! review with submit or retry. A written question runs `Active -> Submitted`
//! with a single countdown and a live word count.
//!
//! Transitions fire from exactly one of {manual action, countdown expiry},
//! whichever occurs first; the losing trigger is a no-op because every
//! transition is guarded on the current step and cancels the countdown it
//! supersedes. Each session emits at most one completed answer.

use crate::capture::device::{assemble_artifact, AnswerRecorder, Artifact, AudioChunk, InputStream};
use crate::capture::timer::{Countdown, TimerTick};
use crate::capture::transcript::TranscriptFeed;

/// Steps of a spoken-question capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpokenStep {
    /// Preparation countdown; recording can be started early
    Prep,
    /// Chunked capture with live transcript, bounded by the answer countdown
    Recording,
    /// Playback of the assembled artifact; exits via submit or retry
    Review,
}

/// Completed spoken answer: the assembled recording plus the final transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAnswer {
    pub artifact: Artifact,
    pub transcript: String,
}

/// Completed written answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenAnswer {
    pub text: String,
    pub word_count: usize,
}

/// State machine for one presentation of a spoken question.
///
/// The input stream is acquired by the caller before construction (access is
/// requested eagerly when the question is presented) and is owned by the
/// session until it ends; retry keeps the stream rather than re-requesting it.
pub struct SpokenCapture {
    step: SpokenStep,
    prep_timer: Countdown,
    record_timer: Countdown,
    stream: Box<dyn InputStream>,
    recorder: Option<Box<dyn AnswerRecorder>>,
    feed: Box<dyn TranscriptFeed>,
    chunks: Vec<AudioChunk>,
    artifact: Option<Artifact>,
    transcript: String,
    completed: bool,
}

impl SpokenCapture {
    /// Creates a session in `Prep` with the preparation countdown running.
    pub fn new(
        prep_seconds: u32,
        max_record_seconds: u32,
        warning_seconds: u32,
        stream: Box<dyn InputStream>,
        feed: Box<dyn TranscriptFeed>,
    ) -> Self {
        let mut prep_timer = Countdown::with_warning(prep_seconds, warning_seconds);
        prep_timer.start();

        Self {
            step: SpokenStep::Prep,
            prep_timer,
            record_timer: Countdown::with_warning(max_record_seconds, warning_seconds),
            stream,
            recorder: None,
            feed,
            chunks: Vec::new(),
            artifact: None,
            transcript: String::new(),
            completed: false,
        }
    }

    pub fn step(&self) -> SpokenStep {
        self.step
    }

    /// Advances the active countdown by one second, applying the automatic
    /// transition when it expires.
    ///
    /// # Errors
    /// - If entering `Recording` fails to start the recorder
    /// - If entering `Review` fails to stop capture or assemble the artifact
    pub fn tick_second(&mut self) -> anyhow::Result<()> {
        match self.step {
            SpokenStep::Prep => {
                if self.prep_timer.tick() == TimerTick::Expired {
                    tracing::debug!("Prep countdown expired; recording starts");
                    self.enter_recording()?;
                }
            }
            SpokenStep::Recording => {
                if self.record_timer.tick() == TimerTick::Expired {
                    tracing::debug!("Recording countdown expired; moving to review");
                    self.enter_review()?;
                }
            }
            SpokenStep::Review => {}
        }
        Ok(())
    }

    /// Manual "start now" during prep. No-op outside `Prep`.
    ///
    /// # Errors
    /// - If the recorder fails to start
    pub fn start_now(&mut self) -> anyhow::Result<()> {
        if self.step != SpokenStep::Prep {
            return Ok(());
        }
        tracing::debug!("Recording started manually before prep expiry");
        self.enter_recording()
    }

    /// Manual "stop" during recording. No-op outside `Recording`.
    ///
    /// # Errors
    /// - If stopping capture or assembling the artifact fails
    pub fn stop(&mut self) -> anyhow::Result<()> {
        if self.step != SpokenStep::Recording {
            return Ok(());
        }
        tracing::debug!("Recording stopped manually");
        self.enter_review()
    }

    /// Drains newly arrived chunks and refreshes the live transcript.
    /// Called from the event loop between ticks; cheap when idle.
    pub fn poll(&mut self) {
        if self.step == SpokenStep::Recording {
            if let Some(recorder) = self.recorder.as_mut() {
                self.chunks.extend(recorder.poll_chunks());
            }
        }
        // The transcript may still receive the feed's final pass shortly
        // after recording stops, so refresh it during review as well.
        if self.feed.is_supported() && self.step != SpokenStep::Prep {
            self.transcript = self.feed.latest();
        }
    }

    /// Submits the reviewed answer. Returns the completed answer exactly once;
    /// `None` outside `Review` or if this presentation already completed.
    pub fn submit(&mut self) -> Option<RecordedAnswer> {
        if self.step != SpokenStep::Review || self.completed {
            return None;
        }
        let artifact = self.artifact.take()?;
        self.completed = true;
        tracing::info!(
            "Answer submitted: {:.2}s recording, {} transcript chars",
            artifact.duration_seconds,
            self.transcript.len()
        );
        Some(RecordedAnswer {
            artifact,
            transcript: std::mem::take(&mut self.transcript),
        })
    }

    /// Discards the reviewed recording and returns to `Prep` with fresh
    /// countdowns. The input stream is kept, not re-requested.
    pub fn retry(&mut self) {
        if self.step != SpokenStep::Review || self.completed {
            return;
        }
        tracing::debug!("Recording discarded; returning to prep");
        self.chunks.clear();
        self.artifact = None;
        self.transcript.clear();
        self.prep_timer.start();
        self.record_timer.cancel();
        self.step = SpokenStep::Prep;
    }

    /// Remaining seconds on whichever countdown governs the current step.
    pub fn remaining(&self) -> u32 {
        match self.step {
            SpokenStep::Prep => self.prep_timer.remaining(),
            _ => self.record_timer.remaining(),
        }
    }

    /// Near-expiry warning for the countdown governing the current step.
    pub fn is_warning(&self) -> bool {
        match self.step {
            SpokenStep::Prep => self.prep_timer.is_warning(),
            SpokenStep::Recording => self.record_timer.is_warning(),
            SpokenStep::Review => false,
        }
    }

    /// Remaining time on the governing countdown as "m:ss".
    pub fn format_remaining(&self) -> String {
        match self.step {
            SpokenStep::Prep => self.prep_timer.format_remaining(),
            _ => self.record_timer.format_remaining(),
        }
    }

    /// Live input level for the preview meter.
    pub fn preview_level(&self) -> u8 {
        self.stream.preview_level()
    }

    /// The live (or final) transcript accumulated so far.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn transcription_supported(&self) -> bool {
        self.feed.is_supported()
    }

    pub fn transcription_listening(&self) -> bool {
        self.feed.is_listening()
    }

    /// The assembled recording, available during `Review`.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    fn enter_recording(&mut self) -> anyhow::Result<()> {
        debug_assert_eq!(self.step, SpokenStep::Prep);
        // Cancel the losing trigger first so a stale expiry can't fire a
        // transition for a state already left.
        self.prep_timer.cancel();
        self.chunks.clear();
        self.artifact = None;
        self.recorder = Some(self.stream.start_recording()?);
        self.record_timer.start();
        if self.feed.is_supported() {
            self.feed.start();
            self.transcript.clear();
        }
        self.step = SpokenStep::Recording;
        Ok(())
    }

    fn enter_review(&mut self) -> anyhow::Result<()> {
        debug_assert_eq!(self.step, SpokenStep::Recording);
        self.record_timer.cancel();
        if let Some(mut recorder) = self.recorder.take() {
            self.chunks.extend(recorder.stop()?);
        }
        self.feed.stop();
        if self.feed.is_supported() {
            self.transcript = self.feed.latest();
        }
        // Assembly only happens here, after capture has fully stopped.
        self.artifact = Some(assemble_artifact(&self.chunks, self.stream.sample_rate())?);
        self.step = SpokenStep::Review;
        Ok(())
    }
}

impl Drop for SpokenCapture {
    fn drop(&mut self) {
        // No leaked recorders, feeds, or device streams past the session.
        if let Some(mut recorder) = self.recorder.take() {
            let _ = recorder.stop();
        }
        self.feed.stop();
        self.stream.release();
    }
}

/// Steps of a written-question capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrittenStep {
    Active,
    Submitted,
}

/// State machine for one presentation of a written question.
pub struct WrittenCapture {
    step: WrittenStep,
    timer: Countdown,
    text: String,
}

impl WrittenCapture {
    /// Creates a session in `Active` with the answer countdown running.
    pub fn new(max_seconds: u32, warning_seconds: u32) -> Self {
        let mut timer = Countdown::with_warning(max_seconds, warning_seconds);
        timer.start();
        Self {
            step: WrittenStep::Active,
            timer,
            text: String::new(),
        }
    }

    pub fn step(&self) -> WrittenStep {
        self.step
    }

    /// Replaces the answer text. Ignored after submission.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if self.step == WrittenStep::Active {
            self.text = text.into();
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Count of whitespace-delimited non-empty tokens in the answer.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Manual submit is only available with at least one word written.
    pub fn can_submit(&self) -> bool {
        self.step == WrittenStep::Active && self.word_count() > 0
    }

    /// Manual submit. Returns the answer exactly once; `None` when the word
    /// count is zero or the session already submitted.
    pub fn submit(&mut self) -> Option<WrittenAnswer> {
        if !self.can_submit() {
            return None;
        }
        Some(self.finalize())
    }

    /// Advances the countdown by one second. On expiry the answer is
    /// auto-submitted regardless of content, including empty content.
    pub fn tick_second(&mut self) -> Option<WrittenAnswer> {
        if self.step != WrittenStep::Active {
            return None;
        }
        if self.timer.tick() == TimerTick::Expired {
            tracing::debug!("Writing time expired; auto-submitting answer");
            return Some(self.finalize());
        }
        None
    }

    pub fn remaining(&self) -> u32 {
        self.timer.remaining()
    }

    pub fn is_warning(&self) -> bool {
        self.timer.is_warning()
    }

    pub fn format_remaining(&self) -> String {
        self.timer.format_remaining()
    }

    fn finalize(&mut self) -> WrittenAnswer {
        self.timer.cancel();
        self.step = WrittenStep::Submitted;
        WrittenAnswer {
            word_count: self.word_count(),
            text: std::mem::take(&mut self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Shared observation point for the fake device.
    #[derive(Debug, Default)]
    struct FakeDeviceState {
        released: bool,
        spans_started: usize,
        recorder_stopped: usize,
    }

    struct FakeStream {
        state: Arc<Mutex<FakeDeviceState>>,
        /// Chunk script handed to each recorder span in turn.
        spans: Arc<Mutex<VecDeque<Vec<AudioChunk>>>>,
    }

    impl FakeStream {
        fn new(
            spans: Vec<Vec<AudioChunk>>,
        ) -> (Self, Arc<Mutex<FakeDeviceState>>) {
            let state = Arc::new(Mutex::new(FakeDeviceState::default()));
            let stream = Self {
                state: Arc::clone(&state),
                spans: Arc::new(Mutex::new(spans.into())),
            };
            (stream, state)
        }
    }

    impl InputStream for FakeStream {
        fn preview_level(&self) -> u8 {
            42
        }

        fn sample_rate(&self) -> u32 {
            16000
        }

        fn start_recording(&mut self) -> anyhow::Result<Box<dyn AnswerRecorder>> {
            let mut state = self.state.lock().unwrap();
            state.spans_started += 1;
            let chunks = self
                .spans
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default();
            Ok(Box::new(FakeRecorder {
                state: Arc::clone(&self.state),
                pending: chunks.into(),
            }))
        }

        fn release(&mut self) {
            self.state.lock().unwrap().released = true;
        }
    }

    struct FakeRecorder {
        state: Arc<Mutex<FakeDeviceState>>,
        pending: VecDeque<AudioChunk>,
    }

    impl AnswerRecorder for FakeRecorder {
        fn poll_chunks(&mut self) -> Vec<AudioChunk> {
            // Deliver one chunk per poll to exercise ordering
            self.pending.pop_front().into_iter().collect()
        }

        fn stop(&mut self) -> anyhow::Result<Vec<AudioChunk>> {
            self.state.lock().unwrap().recorder_stopped += 1;
            Ok(self.pending.drain(..).collect())
        }
    }

    #[derive(Debug, Default)]
    struct FakeFeedState {
        transcript: String,
        listening: bool,
        starts: usize,
        stops: usize,
    }

    struct FakeFeed {
        state: Arc<Mutex<FakeFeedState>>,
    }

    impl FakeFeed {
        fn new() -> (Self, Arc<Mutex<FakeFeedState>>) {
            let state = Arc::new(Mutex::new(FakeFeedState::default()));
            (
                Self {
                    state: Arc::clone(&state),
                },
                state,
            )
        }
    }

    impl TranscriptFeed for FakeFeed {
        fn is_supported(&self) -> bool {
            true
        }

        fn start(&mut self) {
            let mut state = self.state.lock().unwrap();
            state.transcript.clear();
            state.listening = true;
            state.starts += 1;
        }

        fn stop(&mut self) {
            let mut state = self.state.lock().unwrap();
            state.listening = false;
            state.stops += 1;
        }

        fn is_listening(&self) -> bool {
            self.state.lock().unwrap().listening
        }

        fn latest(&self) -> String {
            self.state.lock().unwrap().transcript.clone()
        }
    }

    fn chunk(samples: &[i16]) -> AudioChunk {
        AudioChunk {
            samples: samples.to_vec(),
        }
    }

    fn spoken_with_spans(
        spans: Vec<Vec<AudioChunk>>,
    ) -> (
        SpokenCapture,
        Arc<Mutex<FakeDeviceState>>,
        Arc<Mutex<FakeFeedState>>,
    ) {
        let (stream, device_state) = FakeStream::new(spans);
        let (feed, feed_state) = FakeFeed::new();
        let capture = SpokenCapture::new(3, 5, 30, Box::new(stream), Box::new(feed));
        (capture, device_state, feed_state)
    }

    #[test]
    fn prep_expiry_starts_recording_automatically() {
        let (mut capture, device, _) = spoken_with_spans(vec![vec![chunk(&[1])]]);
        assert_eq!(capture.step(), SpokenStep::Prep);

        capture.tick_second().unwrap();
        capture.tick_second().unwrap();
        assert_eq!(capture.step(), SpokenStep::Prep);
        capture.tick_second().unwrap();

        assert_eq!(capture.step(), SpokenStep::Recording);
        assert_eq!(device.lock().unwrap().spans_started, 1);
    }

    #[test]
    fn manual_start_cancels_prep_timer() {
        let (mut capture, device, _) = spoken_with_spans(vec![vec![chunk(&[1])]]);

        capture.start_now().unwrap();
        assert_eq!(capture.step(), SpokenStep::Recording);

        // The stale prep expiry must not fire a second transition
        for _ in 0..4 {
            capture.tick_second().unwrap();
        }
        assert_eq!(capture.step(), SpokenStep::Recording);
        assert_eq!(device.lock().unwrap().spans_started, 1);
    }

    #[test]
    fn racing_triggers_fire_exactly_one_transition() {
        let (mut capture, device, _) = spoken_with_spans(vec![vec![chunk(&[1])]]);

        // Expiry and manual trigger land on the same tick: expiry wins,
        // the manual trigger is an observable no-op.
        for _ in 0..3 {
            capture.tick_second().unwrap();
        }
        assert_eq!(capture.step(), SpokenStep::Recording);
        capture.start_now().unwrap();
        assert_eq!(capture.step(), SpokenStep::Recording);
        assert_eq!(device.lock().unwrap().spans_started, 1);

        // Same race on the stop side: manual stop wins, the expiry that
        // would have fired on the same tick does nothing.
        capture.stop().unwrap();
        assert_eq!(capture.step(), SpokenStep::Review);
        capture.tick_second().unwrap();
        assert_eq!(capture.step(), SpokenStep::Review);
        assert_eq!(device.lock().unwrap().recorder_stopped, 1);
    }

    #[test]
    fn chunks_assemble_in_arrival_order() {
        let (mut capture, _, _) = spoken_with_spans(vec![vec![
            chunk(&[1, 2]),
            chunk(&[3]),
            chunk(&[4, 5]),
        ]]);

        capture.start_now().unwrap();
        capture.poll(); // drains first chunk
        capture.stop().unwrap(); // final drain picks up the rest

        let artifact = capture.artifact().unwrap();
        let mut reader =
            hound::WavReader::new(std::io::Cursor::new(&artifact.wav_bytes)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn transcript_follows_feed_and_finalizes_on_stop() {
        let (mut capture, _, feed) = spoken_with_spans(vec![vec![chunk(&[1])]]);

        capture.start_now().unwrap();
        assert_eq!(feed.lock().unwrap().starts, 1);

        feed.lock().unwrap().transcript = "hello".to_string();
        capture.poll();
        assert_eq!(capture.transcript(), "hello");

        // Full-replace semantics: the new value supersedes, not appends
        feed.lock().unwrap().transcript = "hello world".to_string();
        capture.poll();
        assert_eq!(capture.transcript(), "hello world");

        capture.stop().unwrap();
        assert_eq!(feed.lock().unwrap().stops, 1);
        assert_eq!(capture.transcript(), "hello world");
    }

    #[test]
    fn submit_emits_exactly_one_answer() {
        let (mut capture, _, feed) = spoken_with_spans(vec![vec![chunk(&[1, 2])]]);

        // Submitting before review produces nothing
        assert!(capture.submit().is_none());

        capture.start_now().unwrap();
        feed.lock().unwrap().transcript = "my answer".to_string();
        capture.stop().unwrap();

        let answer = capture.submit().expect("first submit yields the answer");
        assert_eq!(answer.transcript, "my answer");
        assert!(capture.submit().is_none(), "second submit must not emit");
    }

    #[test]
    fn retry_discards_and_rerecords_on_the_same_stream() {
        let (mut capture, device, _) = spoken_with_spans(vec![
            vec![chunk(&[1, 2])],
            vec![chunk(&[7, 8, 9])],
        ]);

        capture.start_now().unwrap();
        capture.stop().unwrap();
        assert!(capture.artifact().is_some());

        capture.retry();
        assert_eq!(capture.step(), SpokenStep::Prep);
        assert!(capture.artifact().is_none());
        assert_eq!(capture.transcript(), "");
        assert!(!device.lock().unwrap().released, "stream must be preserved");

        capture.start_now().unwrap();
        capture.stop().unwrap();
        assert_eq!(device.lock().unwrap().spans_started, 2);

        let artifact = capture.artifact().unwrap();
        let mut reader =
            hound::WavReader::new(std::io::Cursor::new(&artifact.wav_bytes)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![7, 8, 9], "retry must discard the first take");
    }

    #[test]
    fn dropping_the_session_releases_the_stream() {
        let (capture, device, feed) = spoken_with_spans(vec![vec![chunk(&[1])]]);
        drop(capture);
        assert!(device.lock().unwrap().released);
        assert!(!feed.lock().unwrap().listening);
    }

    #[test]
    fn recording_expiry_moves_to_review() {
        let (mut capture, device, _) = spoken_with_spans(vec![vec![chunk(&[1])]]);

        capture.start_now().unwrap();
        for _ in 0..5 {
            capture.tick_second().unwrap();
        }
        assert_eq!(capture.step(), SpokenStep::Review);
        assert_eq!(device.lock().unwrap().recorder_stopped, 1);
    }

    #[test]
    fn written_word_count_derivation() {
        let mut capture = WrittenCapture::new(60, 30);
        assert_eq!(capture.word_count(), 0);
        assert!(!capture.can_submit());

        capture.set_text("  a  b ");
        assert_eq!(capture.word_count(), 2);
        assert!(capture.can_submit());

        capture.set_text(" \t \n ");
        assert_eq!(capture.word_count(), 0);
        assert!(!capture.can_submit());
    }

    #[test]
    fn written_manual_submit_requires_content() {
        let mut capture = WrittenCapture::new(60, 30);
        assert!(capture.submit().is_none());

        capture.set_text("hello world");
        let answer = capture.submit().unwrap();
        assert_eq!(answer.text, "hello world");
        assert_eq!(answer.word_count, 2);

        assert_eq!(capture.step(), WrittenStep::Submitted);
        assert!(capture.submit().is_none());
    }

    #[test]
    fn written_expiry_auto_submits_even_when_empty() {
        let mut capture = WrittenCapture::new(2, 30);
        assert!(capture.tick_second().is_none());
        let answer = capture.tick_second().expect("expiry auto-submits");
        assert_eq!(answer.text, "");
        assert_eq!(answer.word_count, 0);

        // Expired session accepts no further edits or submissions
        capture.set_text("late");
        assert_eq!(capture.text(), "");
        assert!(capture.tick_second().is_none());
    }

    #[test]
    fn written_submit_and_expiry_are_mutually_exclusive() {
        let mut capture = WrittenCapture::new(1, 30);
        capture.set_text("quick");
        let answer = capture.submit().unwrap();
        assert_eq!(answer.word_count, 1);

        // The countdown that would expire on this tick was cancelled
        assert!(capture.tick_second().is_none());
    }
}
