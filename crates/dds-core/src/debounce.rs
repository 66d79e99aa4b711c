//! Reparse debouncing: "parse after N milliseconds without a change".
//!
//! Time is always passed in by the caller, so the host decides where `now` comes from (an event
//! loop tick, a timer callback) and tests never sleep.

use std::time::{Duration, Instant};

/// Debounced deadline that restarts on every [`Debouncer::touch`].
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create an idle debouncer.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record activity at `now`, (re)starting the delay. A pending deadline is cancelled.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` while a deadline is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the deadline, if one is pending.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Returns `true` exactly once when the deadline has passed, clearing it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        assert!(!debouncer.poll(start));

        debouncer.touch(start);
        assert!(debouncer.is_pending());
        assert!(!debouncer.poll(start + Duration::from_millis(299)));
        assert!(debouncer.poll(start + Duration::from_millis(300)));
        assert!(!debouncer.poll(start + Duration::from_millis(301)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_touch_restarts_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.touch(start);
        debouncer.touch(start + Duration::from_millis(80));
        assert!(!debouncer.poll(start + Duration::from_millis(120)));
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(120)),
            Some(Duration::from_millis(60))
        );
        assert!(debouncer.poll(start + Duration::from_millis(180)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.touch(start);
        debouncer.cancel();
        assert!(!debouncer.poll(start + Duration::from_secs(1)));
        assert_eq!(debouncer.remaining(start), None);
    }
}
