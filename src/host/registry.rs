//! JSONL-backed process registry.
//!
//! One `Process` JSON object per line. The whole file is loaded into memory on
//! open; the registry is read-only afterwards.
//!
//! Filter dialect:
//! - empty: every process
//! - `id:5 9 12` (optionally wrapped in double quotes): exactly those ids
//! - anything else: case-insensitive substring match on the title
//!
//! Results are always ordered by id.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::traits::{
    ListMode, ProcessFilter, ProcessListQuery, ProcessListView, ProcessStore, QueryFlags,
};
use crate::domain::{Process, ProcessId};
use crate::error::{MetaBackupError, Result};

const ID_PREFIX: &str = "id:";

/// Parsed form of a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    All,
    Ids(HashSet<ProcessId>),
    Title(String),
}

impl Selection {
    fn parse(filter: &str) -> Result<Self> {
        let trimmed = filter.trim();
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(trimmed)
            .trim();

        if unquoted.is_empty() {
            return Ok(Selection::All);
        }

        if let Some(ids) = unquoted.strip_prefix(ID_PREFIX) {
            let ids = ids
                .split_whitespace()
                .map(|token| {
                    token.parse::<ProcessId>().map_err(|_| {
                        MetaBackupError::Filter(format!("invalid process id '{}'", token))
                    })
                })
                .collect::<Result<HashSet<_>>>()?;
            return Ok(Selection::Ids(ids));
        }

        Ok(Selection::Title(unquoted.to_lowercase()))
    }

    fn matches(&self, process: &Process) -> bool {
        match self {
            Selection::All => true,
            Selection::Ids(ids) => ids.contains(&process.id),
            Selection::Title(needle) => process.title.to_lowercase().contains(needle.as_str()),
        }
    }
}

/// In-memory process registry.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    processes: BTreeMap<ProcessId, Process>,
}

impl ProcessRegistry {
    /// Load a registry from a JSONL file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            MetaBackupError::Registry(format!("cannot open {}: {}", path.display(), e))
        })?;
        let reader = BufReader::new(file);

        let mut processes = BTreeMap::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let process: Process = serde_json::from_str(&line).map_err(|e| {
                MetaBackupError::Registry(format!("{}:{}: {}", path.display(), index + 1, e))
            })?;
            if processes.contains_key(&process.id) {
                return Err(MetaBackupError::Registry(format!(
                    "{}:{}: duplicate process id {}",
                    path.display(),
                    index + 1,
                    process.id
                )));
            }
            processes.insert(process.id, process);
        }

        log::info!("Loaded {} processes from {}", processes.len(), path.display());
        Ok(Self { processes })
    }

    /// Build a registry from records; later duplicates replace earlier ones.
    pub fn from_processes(processes: impl IntoIterator<Item = Process>) -> Self {
        Self {
            processes: processes.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Processes matching `filter`, ordered by id.
    pub fn select(&self, filter: &str, flags: QueryFlags) -> Result<Vec<&Process>> {
        let selection = Selection::parse(filter)?;
        Ok(self
            .processes
            .values()
            .filter(|p| flags.templates || !p.template)
            .filter(|p| selection.matches(p))
            .collect())
    }
}

#[async_trait]
impl ProcessFilter for ProcessRegistry {
    async fn resolve(&self, filter: &str, flags: QueryFlags) -> Result<Vec<ProcessId>> {
        Ok(self.select(filter, flags)?.into_iter().map(|p| p.id).collect())
    }
}

#[async_trait]
impl ProcessStore for ProcessRegistry {
    async fn get(&self, id: ProcessId) -> Result<Option<Process>> {
        Ok(self.processes.get(&id).cloned())
    }
}

/// Renders a process list query against a registry as plain text.
#[derive(Debug, Clone)]
pub struct RegistryListView {
    registry: Arc<ProcessRegistry>,
}

impl RegistryListView {
    pub fn new(registry: Arc<ProcessRegistry>) -> Self {
        Self { registry }
    }
}

impl ProcessListView for RegistryListView {
    fn show(&self, query: &ProcessListQuery) -> Result<String> {
        let flags = QueryFlags {
            templates: query.mode == ListMode::All,
        };
        let matched = self.registry.select(&query.filter, flags)?;

        let mut out = format!("{} processes match {}\n", matched.len(), query.filter);
        for process in matched {
            // Writing to a String cannot fail
            let _ = writeln!(out, "  {:>8}  {}", process.id, process.title);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ProcessRegistry {
        let mut template = Process::new(1, "Template Monograph", "/d/1/meta.xml");
        template.template = true;
        ProcessRegistry::from_processes(vec![
            Process::new(12, "Newspaper 1902", "/d/12/meta.xml"),
            Process::new(5, "Newspaper 1901", "/d/5/meta.xml"),
            Process::new(9, "Atlas", "/d/9/meta.xml"),
            template,
        ])
    }

    #[tokio::test]
    async fn test_empty_filter_returns_all_in_id_order() {
        let registry = sample();
        let ids = registry.resolve("", QueryFlags::BACKUP).await.unwrap();
        assert_eq!(ids, vec![5, 9, 12]);
    }

    #[tokio::test]
    async fn test_templates_only_with_flag() {
        let registry = sample();
        let ids = registry.resolve("", QueryFlags { templates: true }).await.unwrap();
        assert_eq!(ids, vec![1, 5, 9, 12]);
    }

    #[tokio::test]
    async fn test_id_filter() {
        let registry = sample();
        let ids = registry.resolve("\"id:12 5 \"", QueryFlags::BACKUP).await.unwrap();
        assert_eq!(ids, vec![5, 12]);

        let ids = registry.resolve("id:404", QueryFlags::BACKUP).await.unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_id_filter() {
        let registry = sample();
        let err = registry.resolve("id:5 x", QueryFlags::BACKUP).await.unwrap_err();
        assert!(matches!(err, MetaBackupError::Filter(_)));
    }

    #[tokio::test]
    async fn test_title_filter_case_insensitive() {
        let registry = sample();
        let ids = registry.resolve("newspaper", QueryFlags::BACKUP).await.unwrap();
        assert_eq!(ids, vec![5, 12]);
    }

    #[tokio::test]
    async fn test_get() {
        let registry = sample();
        let process = registry.get(9).await.unwrap().unwrap();
        assert_eq!(process.title, "Atlas");
        assert!(registry.get(77).await.unwrap().is_none());
    }

    #[test]
    fn test_open_jsonl() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("processes.jsonl");
        std::fs::write(
            &path,
            concat!(
                "{\"id\":2,\"title\":\"B\",\"metadata_file\":\"/d/2/meta.xml\"}\n",
                "\n",
                "{\"id\":1,\"title\":\"A\",\"metadata_file\":\"/d/1/meta.xml\"}\n",
            ),
        )
        .unwrap();

        let registry = ProcessRegistry::open(&path).unwrap();
        assert_eq!(registry.len(), 2);
        let titles: Vec<&str> = registry
            .select("", QueryFlags::BACKUP)
            .unwrap()
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_open_rejects_duplicates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("processes.jsonl");
        std::fs::write(
            &path,
            concat!(
                "{\"id\":1,\"title\":\"A\",\"metadata_file\":\"/d/1/meta.xml\"}\n",
                "{\"id\":1,\"title\":\"B\",\"metadata_file\":\"/d/1/meta.xml\"}\n",
            ),
        )
        .unwrap();

        let err = ProcessRegistry::open(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate process id 1"));
    }

    #[test]
    fn test_open_reports_bad_line() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("processes.jsonl");
        std::fs::write(&path, "not json\n").unwrap();

        let err = ProcessRegistry::open(&path).unwrap_err();
        assert!(matches!(err, MetaBackupError::Registry(_)));
        assert!(err.to_string().contains(":1:"));
    }

    #[test]
    fn test_list_view_renders_matches() {
        let view = RegistryListView::new(Arc::new(sample()));
        let out = view
            .show(&ProcessListQuery {
                filter: "\"id:9 12\"".to_string(),
                mode: ListMode::Current,
            })
            .unwrap();
        assert!(out.starts_with("2 processes match"));
        assert!(out.contains("Atlas"));
        assert!(out.contains("Newspaper 1902"));
    }
}
