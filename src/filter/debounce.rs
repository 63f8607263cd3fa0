//! Deadline-based coalescing of rapid input.
//!
//! The caller supplies the clock, so tests drive time explicitly instead of
//! sleeping.

use std::time::{Duration, Instant};

/// Shortest quiet period before a buffered value is released.
pub const MIN_DEBOUNCE: Duration = Duration::from_millis(700);

/// Buffers the latest pushed value until no new value has arrived for the
/// configured delay.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer. Delays shorter than [`MIN_DEBOUNCE`] are raised
    /// to it.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: delay.max(MIN_DEBOUNCE),
            pending: None,
        }
    }

    /// Effective delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Buffer `value`, replacing any pending value and restarting the timer.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Release the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Release the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    /// Drop the pending value without releasing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a value is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, d)| *d)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(MIN_DEBOUNCE)
    }
}
