//! Run progress counters.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Total and processed counts for the current run.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    total: AtomicUsize,
    processed: AtomicUsize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a run over `total` items.
    pub fn start(&self, total: usize) {
        self.processed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
    }

    /// Count one finished item, successful or not.
    pub fn advance(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    /// `floor(100 * processed / total)`, 0 for an empty run.
    pub fn percent(&self) -> u8 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let percent = (self.processed().saturating_mul(100) / total).min(100);
        percent as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_run_is_zero_percent() {
        let progress = ProgressTracker::new();
        assert_eq!(progress.percent(), 0);
        progress.start(0);
        assert_eq!(progress.percent(), 0);
    }

    #[test]
    fn test_percent_floors() {
        let progress = ProgressTracker::new();
        progress.start(3);
        progress.advance();
        assert_eq!(progress.percent(), 33);
        progress.advance();
        assert_eq!(progress.percent(), 66);
        progress.advance();
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_percent_monotonic() {
        let progress = ProgressTracker::new();
        progress.start(7);
        let mut last = progress.percent();
        for _ in 0..7 {
            progress.advance();
            let now = progress.percent();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 100);
        assert_eq!(progress.processed(), 7);
    }

    #[test]
    fn test_start_resets_processed() {
        let progress = ProgressTracker::new();
        progress.start(2);
        progress.advance();
        progress.start(4);
        assert_eq!(progress.processed(), 0);
        assert_eq!(progress.total(), 4);
    }
}
