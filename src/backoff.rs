//! Exponential backoff timers.
//!
//! Two independent instances exist at runtime, one per failure domain (link,
//! registration), because link loss and registration rejection recover at
//! different points in the connection state machine.

use std::time::Duration;

/// Delay-doubling retry policy bounded by a floor and a ceiling.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    floor: Duration,
    ceiling: Duration,
}

impl Backoff {
    /// Create a backoff timer starting at `floor`.
    pub fn new(floor: Duration, ceiling: Duration) -> Self {
        Self {
            current: floor,
            floor,
            ceiling,
        }
    }

    /// Return the delay to sleep for this failure and advance the timer
    /// (double, capped at the ceiling).
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.ceiling);
        delay
    }

    /// Reset to the floor after a success.
    pub fn reset(&mut self) {
        self.current = self.floor;
    }

    /// The delay the next failure would incur.
    #[cfg(test)]
    pub fn current(&self) -> Duration {
        self.current
    }
}
