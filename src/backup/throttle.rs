//! Notification throttling.
//!
//! Collapses bursts of progress updates into at most one notification per
//! interval. The reference instant only moves when a notification fires.

use std::time::Duration;

use tokio::time::Instant;

/// Fires at most once per `interval`.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Instant,
}

impl Throttle {
    /// Throttle whose first window starts now.
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, start: Instant) -> Self {
        Self { interval, last: start }
    }

    /// Check the clock; `true` means a notification should go out now.
    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }

    /// Same as `ready` with an explicit clock reading.
    ///
    /// Fires only when strictly more than `interval` has passed.
    pub fn ready_at(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) > self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_millis(1000);

    #[test]
    fn test_not_ready_within_first_window() {
        let start = Instant::now();
        let mut throttle = Throttle::starting_at(SECOND, start);
        assert!(!throttle.ready_at(start));
        assert!(!throttle.ready_at(start + Duration::from_millis(500)));
        assert!(!throttle.ready_at(start + SECOND));
    }

    #[test]
    fn test_fires_after_interval_and_resets() {
        let start = Instant::now();
        let mut throttle = Throttle::starting_at(SECOND, start);

        let first = start + Duration::from_millis(1001);
        assert!(throttle.ready_at(first));
        assert!(!throttle.ready_at(first + Duration::from_millis(10)));
        assert!(!throttle.ready_at(first + SECOND));
        assert!(throttle.ready_at(first + Duration::from_millis(1001)));
    }

    #[test]
    fn test_burst_coalesces() {
        let start = Instant::now();
        let mut throttle = Throttle::starting_at(SECOND, start);

        // 100 items finishing every 25ms over 2.5s
        let fired = (1..=100)
            .filter(|i| throttle.ready_at(start + Duration::from_millis(25 * i)))
            .count();
        assert_eq!(fired, 2);
    }

    #[test]
    fn test_clock_going_backwards_does_not_fire() {
        let start = Instant::now() + SECOND;
        let mut throttle = Throttle::starting_at(SECOND, start);
        assert!(!throttle.ready_at(start - Duration::from_millis(500)));
    }
}
