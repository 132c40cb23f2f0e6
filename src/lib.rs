//! metabackup - batch snapshots of process metadata files
//!
//! Copies the metadata files of a filtered set of processes to
//! timestamp-suffixed backups on a background task, with live progress,
//! throttled UI notifications and cooperative cancellation.

pub mod backup;
pub mod domain;
pub mod error;
pub mod host;
pub mod storage;

pub use error::{MetaBackupError, Result};
