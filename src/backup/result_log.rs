//! Ordered record of backup outcomes for one run.

use std::collections::{HashSet, VecDeque};

use parking_lot::Mutex;

use crate::domain::{BackupOutcome, ProcessId, StatusFilter};

/// Newest-first log of outcomes.
///
/// Appends come from the run task while UI readers take snapshots, so every
/// read returns an owned copy.
#[derive(Debug, Default)]
pub struct ResultLog {
    entries: Mutex<VecDeque<BackupOutcome>>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome as the most recent entry.
    pub fn append(&self, outcome: BackupOutcome) {
        self.entries.lock().push_front(outcome);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Every outcome, newest first.
    pub fn full(&self) -> Vec<BackupOutcome> {
        self.entries.lock().iter().cloned().collect()
    }

    /// At most `limit` of the newest outcomes.
    pub fn capped(&self, limit: usize) -> Vec<BackupOutcome> {
        self.entries.lock().iter().take(limit).cloned().collect()
    }

    /// Distinct ids of outcomes matching `filter`, newest first.
    pub fn ids_where(&self, filter: StatusFilter) -> Vec<ProcessId> {
        let entries = self.entries.lock();
        let mut seen = HashSet::new();
        entries
            .iter()
            .filter(|o| filter.matches(o.status))
            .map(|o| o.process_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}
