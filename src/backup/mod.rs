//! Batch backup engine.
//!
//! - ArtifactCopier: copies one process's metadata artifacts to timestamped backups
//! - ResultLog: newest-first record of per-process outcomes
//! - ProgressTracker: total/processed counters and percentage
//! - Throttle: coalesces UI notifications
//! - BatchRunner: drives a run on a background task with cooperative cancellation

mod copier;
mod progress;
mod result_log;
mod runner;
mod throttle;

pub use copier::{ArtifactCopier, BackupStamp, STAMP_FORMAT};
pub use progress::ProgressTracker;
pub use result_log::ResultLog;
pub use runner::{
    BatchRunner, RunHandle, RunPhase, RunState, RunSummary, RunnerConfig, UPDATE_EVENT,
};
pub use throttle::Throttle;
