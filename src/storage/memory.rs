//! In-memory storage for callers that drive a run without touching the filesystem.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::traits::FileStorage;
use crate::error::{MetaBackupError, Result};

/// File contents keyed by path.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    /// Paths whose reads fail as if permission was denied
    denied: Mutex<HashSet<PathBuf>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.lock().insert(path.into(), contents.into());
    }

    /// Make every read of `path` fail.
    pub fn deny(&self, path: impl Into<PathBuf>) {
        self.denied.lock().insert(path.into());
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().get(path).cloned()
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.lock().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl FileStorage for MemoryStorage {
    async fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        if self.denied.lock().contains(src) {
            return Err(MetaBackupError::Storage(format!(
                "failed to copy {}: permission denied",
                src.display()
            )));
        }

        let mut files = self.files.lock();
        let contents = files.get(src).cloned().ok_or_else(|| {
            MetaBackupError::Storage(format!("failed to copy {}: file not found", src.display()))
        })?;
        files.insert(dst.to_path_buf(), contents);
        Ok(())
    }

    async fn file_exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.lock().contains_key(path))
    }
}
