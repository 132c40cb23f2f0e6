//! Process records and their metadata artifact locations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Identifier of a process in the host system.
pub type ProcessId = u32;

/// Suffix appended to the primary file stem to name the anchor artifact.
const ANCHOR_SUFFIX: &str = "_anchor";

/// A unit of work in the host system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,

    /// Display title
    pub title: String,

    /// Path to the primary metadata artifact (usually `.../meta.xml`)
    pub metadata_file: PathBuf,

    /// Templates are blueprints for new processes, not real work items
    #[serde(default)]
    pub template: bool,
}

impl Process {
    pub fn new(id: ProcessId, title: impl Into<String>, metadata_file: impl Into<PathBuf>) -> Self {
        Self {
            id,
            title: title.into(),
            metadata_file: metadata_file.into(),
            template: false,
        }
    }

    /// Artifact locations for this process.
    pub fn artifacts(&self) -> ArtifactPair {
        ArtifactPair::from_primary(&self.metadata_file)
    }
}

/// The primary metadata artifact and the anchor artifact derived from it.
///
/// The anchor only exists on disk for multi-volume processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPair {
    pub primary: PathBuf,
    pub anchor: PathBuf,
}

impl ArtifactPair {
    /// Derive the pair from the primary path: `meta.xml` -> `meta_anchor.xml`.
    ///
    /// Only the file name is rewritten; directories are left untouched even if
    /// they contain the same token.
    pub fn from_primary(primary: &Path) -> Self {
        let anchor_name = match (primary.file_stem(), primary.extension()) {
            (Some(stem), Some(ext)) => format!(
                "{}{}.{}",
                stem.to_string_lossy(),
                ANCHOR_SUFFIX,
                ext.to_string_lossy()
            ),
            (Some(stem), None) => format!("{}{}", stem.to_string_lossy(), ANCHOR_SUFFIX),
            _ => ANCHOR_SUFFIX.trim_start_matches('_').to_string(),
        };

        Self {
            primary: primary.to_path_buf(),
            anchor: primary.with_file_name(anchor_name),
        }
    }

    /// Backup location for `path` with the given timestamp suffix.
    pub fn backup_path(path: &Path, stamp: &str) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push("-");
        name.push(stamp);
        PathBuf::from(name)
    }
}
