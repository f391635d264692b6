//! Transcript feed seam for live speech-to-text during recording.
//!
//! A feed republishes the full accumulated transcript for the current
//! start/stop span: every update replaces the prior value with everything
//! recognized so far, in the order spoken. Feeds may stop listening on their
//! own (error or natural end); the last transcript value is preserved and
//! callers never need to restart them.

/// Live transcript source for one or more recording spans.
pub trait TranscriptFeed {
    /// Whether transcription is available at all. When false, every other
    /// operation is a no-op and the transcript is permanently empty.
    fn is_supported(&self) -> bool;

    /// Resets the accumulated transcript and begins recognition for a new span.
    fn start(&mut self);

    /// Ends recognition for the current span. The accumulated transcript
    /// remains readable afterwards.
    fn stop(&mut self);

    /// Whether recognition is currently active. Flips to false on stop or
    /// when the feed terminates itself after an error.
    fn is_listening(&self) -> bool;

    /// The full accumulated transcript for the current span (full-replace
    /// semantics, not incremental deltas).
    fn latest(&self) -> String;
}

/// Feed used when transcription is unavailable (no model configured, no API
/// key, or disabled). All operations are no-ops and the transcript is empty.
pub struct NullTranscriptFeed;

impl TranscriptFeed for NullTranscriptFeed {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn is_listening(&self) -> bool {
        false
    }

    fn latest(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_feed_is_permanently_empty() {
        let mut feed = NullTranscriptFeed;
        assert!(!feed.is_supported());
        feed.start();
        assert!(!feed.is_listening());
        assert_eq!(feed.latest(), "");
        feed.stop();
        assert_eq!(feed.latest(), "");
    }
}
