//! Storage trait definitions.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Minimal file operations needed to snapshot metadata artifacts.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Copy `src` to `dst`, overwriting `dst` if it exists.
    async fn copy_file(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Whether a regular file exists at `path`.
    async fn file_exists(&self, path: &Path) -> Result<bool>;
}
