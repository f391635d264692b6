//! One-second countdown primitive for question timing.
//!
//! The owning loop calls `tick()` once per elapsed wall-clock second; the
//! countdown itself holds no clock, which keeps it deterministic under test.

/// Result of advancing a countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Countdown is not running (never started, cancelled, or already expired)
    Idle,
    /// Countdown advanced and time remains
    Running,
    /// Countdown reached zero on this tick; reported exactly once per run
    Expired,
}

/// Default seconds-remaining threshold for the near-expiry warning signal.
pub const DEFAULT_WARNING_SECONDS: u32 = 30;

/// A countdown over whole seconds with a single expiry signal.
///
/// `start()` arms the countdown at the configured duration. Each `tick()`
/// counts down one second; the tick that reaches zero reports `Expired` and
/// disarms the countdown, so expiry is observed exactly once per run.
/// `cancel()` disarms without expiring.
#[derive(Debug, Clone)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    warning_threshold: u32,
    running: bool,
    expired: bool,
}

impl Countdown {
    /// Creates an idle countdown for the given duration with the default warning threshold.
    pub fn new(duration_seconds: u32) -> Self {
        Self::with_warning(duration_seconds, DEFAULT_WARNING_SECONDS)
    }

    /// Creates an idle countdown with an explicit warning threshold.
    pub fn with_warning(duration_seconds: u32, warning_seconds: u32) -> Self {
        Self {
            duration: duration_seconds,
            remaining: duration_seconds,
            warning_threshold: warning_seconds,
            running: false,
            expired: false,
        }
    }

    /// Arms the countdown at its full duration.
    ///
    /// Restarting an already-running countdown resets it to the full duration.
    pub fn start(&mut self) {
        self.remaining = self.duration;
        self.running = true;
        self.expired = false;
    }

    /// Disarms the countdown without expiring. Remaining time is left as-is
    /// for display; subsequent ticks report `Idle`.
    pub fn cancel(&mut self) {
        self.running = false;
    }

    /// Changes the duration. While idle this resets the displayed remaining
    /// time; while running the countdown restarts at the new duration
    /// (the reference behavior for a mid-run duration change).
    pub fn set_duration(&mut self, duration_seconds: u32) {
        self.duration = duration_seconds;
        if self.running {
            tracing::debug!("Countdown duration changed while running; restarting");
            self.start();
        } else {
            self.remaining = duration_seconds;
        }
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> TimerTick {
        if !self.running {
            return TimerTick::Idle;
        }

        if self.remaining > 0 {
            self.remaining -= 1;
        }

        if self.remaining == 0 {
            self.running = false;
            self.expired = true;
            TimerTick::Expired
        } else {
            TimerTick::Running
        }
    }

    /// Seconds left on the countdown.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the countdown has reached zero since the last `start()`.
    pub fn has_expired(&self) -> bool {
        self.expired
    }

    /// Near-expiry signal: running with no more than the warning threshold left.
    pub fn is_warning(&self) -> bool {
        self.running && self.remaining <= self.warning_threshold
    }

    /// Remaining time as "m:ss" for display.
    pub fn format_remaining(&self) -> String {
        let minutes = self.remaining / 60;
        let seconds = self.remaining % 60;
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_exactly_once_after_duration_ticks() {
        let mut countdown = Countdown::new(3);
        countdown.start();

        assert_eq!(countdown.tick(), TimerTick::Running);
        assert_eq!(countdown.tick(), TimerTick::Running);
        assert_eq!(countdown.tick(), TimerTick::Expired);
        assert!(countdown.has_expired());

        // Further ticks never re-fire expiry
        assert_eq!(countdown.tick(), TimerTick::Idle);
        assert_eq!(countdown.tick(), TimerTick::Idle);
    }

    #[test]
    fn cancel_suppresses_expiry() {
        let mut countdown = Countdown::new(2);
        countdown.start();
        assert_eq!(countdown.tick(), TimerTick::Running);

        countdown.cancel();
        assert_eq!(countdown.tick(), TimerTick::Idle);
        assert_eq!(countdown.tick(), TimerTick::Idle);
        assert!(!countdown.has_expired());
    }

    #[test]
    fn never_ticks_before_start() {
        let mut countdown = Countdown::new(5);
        assert_eq!(countdown.tick(), TimerTick::Idle);
        assert_eq!(countdown.remaining(), 5);
    }

    #[test]
    fn restart_after_expiry_runs_a_fresh_countdown() {
        let mut countdown = Countdown::new(1);
        countdown.start();
        assert_eq!(countdown.tick(), TimerTick::Expired);

        countdown.start();
        assert!(!countdown.has_expired());
        assert_eq!(countdown.remaining(), 1);
        assert_eq!(countdown.tick(), TimerTick::Expired);
    }

    #[test]
    fn warning_signal_tracks_threshold() {
        let mut countdown = Countdown::with_warning(5, 3);
        countdown.start();
        assert!(!countdown.is_warning());

        countdown.tick(); // 4 left
        assert!(!countdown.is_warning());
        countdown.tick(); // 3 left
        assert!(countdown.is_warning());
        countdown.tick(); // 2 left
        assert!(countdown.is_warning());
    }

    #[test]
    fn set_duration_while_idle_resets_remaining() {
        let mut countdown = Countdown::new(10);
        countdown.set_duration(30);
        assert_eq!(countdown.remaining(), 30);
        assert!(!countdown.is_running());
    }

    #[test]
    fn set_duration_while_running_restarts() {
        let mut countdown = Countdown::new(10);
        countdown.start();
        countdown.tick();
        assert_eq!(countdown.remaining(), 9);

        countdown.set_duration(4);
        assert!(countdown.is_running());
        assert_eq!(countdown.remaining(), 4);
    }

    #[test]
    fn formats_remaining_time() {
        let mut countdown = Countdown::new(125);
        assert_eq!(countdown.format_remaining(), "2:05");
        countdown.start();
        countdown.tick();
        assert_eq!(countdown.format_remaining(), "2:04");
    }
}
