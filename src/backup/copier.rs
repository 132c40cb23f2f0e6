//! Timestamped copies of a process's metadata artifacts.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};

use crate::domain::{ArtifactPair, BackupOutcome, Process};
use crate::error::Result;
use crate::storage::FileStorage;

/// Backup suffix format: millisecond resolution, sorts lexicographically.
pub const STAMP_FORMAT: &str = "%Y-%m-%d-%H%M%S%3f";

/// Timestamp suffix shared by every copy made for one process.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BackupStamp(String);

impl BackupStamp {
    /// Stamp for the current local time.
    pub fn now() -> Self {
        Self::at(&Local::now())
    }

    pub fn at<Tz: TimeZone>(time: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(time.format(STAMP_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackupStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Copies the primary metadata artifact, and the anchor artifact when present,
/// next to the originals with a timestamp suffix.
pub struct ArtifactCopier<S: FileStorage> {
    storage: Arc<S>,
}

impl<S: FileStorage> ArtifactCopier<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Back up `process` using the current time.
    pub async fn backup(&self, process: &Process) -> BackupOutcome {
        self.backup_at(process, &BackupStamp::now()).await
    }

    /// Back up `process` with an explicit stamp.
    ///
    /// Never fails: any error is reported in the returned outcome.
    pub async fn backup_at(&self, process: &Process, stamp: &BackupStamp) -> BackupOutcome {
        match self.copy_artifacts(process, stamp).await {
            Ok(()) => BackupOutcome::ok(process),
            Err(e) => {
                log::debug!("Backup of process {} ({}) failed: {}", process.id, process.title, e);
                BackupOutcome::error(process.id, process.title.clone(), e.to_string())
            }
        }
    }

    async fn copy_artifacts(&self, process: &Process, stamp: &BackupStamp) -> Result<()> {
        let pair = process.artifacts();

        let primary_backup = ArtifactPair::backup_path(&pair.primary, stamp.as_str());
        self.storage.copy_file(&pair.primary, &primary_backup).await?;

        // Anchor files only exist for multi-volume works
        if self.storage.file_exists(&pair.anchor).await? {
            let anchor_backup = ArtifactPair::backup_path(&pair.anchor, stamp.as_str());
            self.storage.copy_file(&pair.anchor, &anchor_backup).await?;
        }

        Ok(())
    }
}
