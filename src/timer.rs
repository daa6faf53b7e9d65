//! Timer: a single absolute deadline used for frame pacing.
//!
//! The engine starts the timer at the top of each frame and sleeps for
//! whatever is left of the frame period once the frame's work is done.

use std::time::{Duration, Instant};

/// A deadline-based frame limiter.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    /// Instant at which the timer finishes.
    deadline: Instant,
}

impl Timer {
    /// Create a timer that is already finished.
    pub fn new() -> Self {
        Self {
            deadline: Instant::now(),
        }
    }

    /// Restart the timer: the deadline becomes now + `duration`.
    pub fn start(&mut self, duration: Duration) {
        self.deadline = Instant::now() + duration;
    }

    /// Whether the deadline has passed.
    pub fn finished(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Signed seconds until the deadline (negative once overdue).
    pub fn delta(&self) -> f64 {
        let now = Instant::now();
        if now >= self.deadline {
            -(now - self.deadline).as_secs_f64()
        } else {
            (self.deadline - now).as_secs_f64()
        }
    }

    /// Time left before the deadline, clamped at zero.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_timer_basic() {
        let mut timer = Timer::new();
        timer.start(Duration::from_millis(100));

        assert!(!timer.finished());
        assert!(timer.delta() > 0.0);
        assert!(timer.remaining() > Duration::ZERO);

        thread::sleep(Duration::from_millis(120));

        assert!(timer.finished());
        assert!(timer.delta() <= 0.0);
        assert_eq!(timer.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_timer_new_is_finished() {
        let timer = Timer::new();
        assert!(timer.finished());
        assert!(timer.delta() <= 0.0);
    }

    #[test]
    fn test_timer_restart() {
        let mut timer = Timer::new();
        timer.start(Duration::ZERO);
        assert!(timer.finished());

        timer.start(Duration::from_secs(10));
        assert!(!timer.finished());
        assert!(timer.delta() > 9.0);
    }
}
