//! Timer utilities
//!
//! Monotonic timing for case bodies.

use std::time::{Duration, Instant};

/// Monotonic timer for measuring a case body
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    label: String,
}

impl Timer {
    /// Create and start a new timer
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            label: label.into(),
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop timer and return the full elapsed time
    pub fn stop(self) -> Duration {
        let elapsed = self.elapsed();
        tracing::trace!("{}: {:?}", self.label, elapsed);
        elapsed
    }
}

/// Whole milliseconds of `duration`, truncated, as reported to users
pub fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_timer() {
        let timer = Timer::start("test");
        sleep(Duration::from_millis(10));
        assert!(timer.elapsed() >= Duration::from_millis(10));
        assert!(timer.stop() >= Duration::from_millis(10));
    }

    #[test]
    fn test_whole_millis_truncates() {
        assert_eq!(whole_millis(Duration::from_micros(5_700)), 5);
        assert_eq!(whole_millis(Duration::from_micros(999)), 0);
        assert_eq!(whole_millis(Duration::MAX), u64::MAX);
    }
}
