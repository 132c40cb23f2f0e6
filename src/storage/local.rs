//! Local filesystem storage backed by `tokio::fs`.

use std::path::Path;

use async_trait::async_trait;

use super::traits::FileStorage;
use crate::error::{MetaBackupError, Result};

/// Storage on the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        tokio::fs::copy(src, dst).await.map_err(|e| {
            MetaBackupError::Storage(format!(
                "failed to copy {} to {}: {}",
                src.display(),
                dst.display(),
                e
            ))
        })?;
        log::debug!("Copied {} -> {}", src.display(), dst.display());
        Ok(())
    }

    async fn file_exists(&self, path: &Path) -> Result<bool> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(MetaBackupError::Storage(format!(
                "failed to stat {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_file() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("meta.xml");
        let dst = temp.path().join("meta.xml-2024-01-01-000000000");
        std::fs::write(&src, "<mets/>").unwrap();

        let storage = LocalStorage::new();
        storage.copy_file(&src, &dst).await.unwrap();

        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "<mets/>");
        assert_eq!(std::fs::read_to_string(&src).unwrap(), "<mets/>");
    }

    #[tokio::test]
    async fn test_copy_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new();
        let err = storage
            .copy_file(&temp.path().join("missing.xml"), &temp.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, MetaBackupError::Storage(_)));
        assert!(err.to_string().contains("missing.xml"));
    }

    #[tokio::test]
    async fn test_file_exists() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("meta_anchor.xml");
        let storage = LocalStorage::new();

        assert!(!storage.file_exists(&file).await.unwrap());
        std::fs::write(&file, "x").unwrap();
        assert!(storage.file_exists(&file).await.unwrap());
        // Directories are not files
        assert!(!storage.file_exists(temp.path()).await.unwrap());
    }
}
