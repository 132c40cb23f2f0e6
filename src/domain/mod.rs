//! Domain types for metabackup
//!
//! - Process: a unit of work in the host system and its metadata artifacts
//! - BackupOutcome: the per-process result of a backup attempt

pub mod outcome;
pub mod process;

pub use outcome::{BackupOutcome, BackupStatus, StatusFilter};
pub use process::{ArtifactPair, Process, ProcessId};
