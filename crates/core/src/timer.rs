use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    #[error("countdown duration must be greater than zero seconds")]
    ZeroDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    /// Counting down; ticks have effect.
    Running,
    /// Reached zero; the expiry signal has fired, ticks are no-ops.
    Expired,
    /// Frozen by `stop()`; ticks are no-ops.
    Stopped,
}

/// Whole-second countdown from a fixed duration.
///
/// `tick()` is expected once per second from a single scheduling
/// primitive; the >0 to 0 transition is reported exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTimer {
    remaining_secs: u32,
    status: TimerStatus,
}

impl CountdownTimer {
    /// Starts a countdown over `duration_secs`.
    ///
    /// One timer exists per session and cannot be restarted, which
    /// makes the idempotent-start requirement hold by construction.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::ZeroDuration` when `duration_secs` is 0.
    pub fn start(duration_secs: u32) -> Result<Self, TimerError> {
        if duration_secs == 0 {
            return Err(TimerError::ZeroDuration);
        }
        Ok(Self {
            remaining_secs: duration_secs,
            status: TimerStatus::Running,
        })
    }

    /// Advances the countdown by one second.
    ///
    /// Returns `true` exactly once, on the transition from 1 to 0.
    /// Every call after expiry or `stop()` is a no-op returning `false`.
    pub fn tick(&mut self) -> bool {
        if self.status != TimerStatus::Running {
            return false;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.status = TimerStatus::Expired;
            return true;
        }
        false
    }

    /// Freezes the countdown. Used when the session is submitted so a
    /// late tick can never trigger a second auto-submit.
    pub fn stop(&mut self) {
        if self.status == TimerStatus::Running {
            self.status = TimerStatus::Stopped;
        }
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn status(&self) -> TimerStatus {
        self.status
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }
}

/// Renders a second count as `MM:SS`. Pure display helper, no state.
#[must_use]
pub fn format_remaining(secs: u32) -> String {
    let minutes = secs / 60;
    let seconds = secs % 60;
    format!("{minutes:02}:{seconds:02}")
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_rejected() {
        assert_eq!(CountdownTimer::start(0).unwrap_err(), TimerError::ZeroDuration);
    }

    #[test]
    fn counts_down_monotonically_and_expires_once() {
        let duration = 60;
        let mut timer = CountdownTimer::start(duration).unwrap();
        let mut expiries = 0;

        for expected in (0..duration).rev() {
            if timer.tick() {
                expiries += 1;
            }
            assert_eq!(timer.remaining_secs(), expected);
        }
        assert_eq!(expiries, 1);
        assert_eq!(timer.status(), TimerStatus::Expired);

        // Extra ticks change nothing and never re-fire the signal.
        for _ in 0..5 {
            assert!(!timer.tick());
            assert_eq!(timer.remaining_secs(), 0);
        }
    }

    #[test]
    fn stop_freezes_remaining_time() {
        let mut timer = CountdownTimer::start(10).unwrap();
        assert!(!timer.tick());
        timer.stop();

        assert_eq!(timer.status(), TimerStatus::Stopped);
        assert!(!timer.tick());
        assert_eq!(timer.remaining_secs(), 9);
    }

    #[test]
    fn stop_after_expiry_keeps_expired_status() {
        let mut timer = CountdownTimer::start(1).unwrap();
        assert!(timer.tick());
        timer.stop();
        assert_eq!(timer.status(), TimerStatus::Expired);
    }

    #[test]
    fn formats_mm_ss() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(59), "00:59");
        assert_eq!(format_remaining(61), "01:01");
        assert_eq!(format_remaining(45 * 60), "45:00");
    }
}
