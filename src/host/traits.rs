//! Collaborator trait definitions.

use async_trait::async_trait;

use crate::domain::{Process, ProcessId};
use crate::error::Result;

/// Fixed query-mode flags passed along with a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFlags {
    /// Include process templates in the result
    pub templates: bool,
}

impl QueryFlags {
    /// Flags used for backup runs: real processes only.
    pub const BACKUP: QueryFlags = QueryFlags { templates: false };
}

/// Compiles an opaque filter expression into an ordered list of process ids.
#[async_trait]
pub trait ProcessFilter: Send + Sync {
    /// Resolve `filter` to process ids, in the host's natural order.
    async fn resolve(&self, filter: &str, flags: QueryFlags) -> Result<Vec<ProcessId>>;
}

/// Read access to process records.
#[async_trait]
pub trait ProcessStore: Send + Sync {
    /// Fetch a process by id. `Ok(None)` if the id is unknown.
    async fn get(&self, id: ProcessId) -> Result<Option<Process>>;
}

/// Receives live-update signals for a UI. Best effort; must not block.
pub trait NotificationSink: Send + Sync {
    fn send(&self, event: &str);
}

/// How the process list should present a filtered selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    /// Only processes that are currently in work
    #[default]
    Current,
    /// Every process including finished ones
    All,
}

/// A filter handed over to the process list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessListQuery {
    pub filter: String,
    pub mode: ListMode,
}

/// Process list presentation owned by the host.
pub trait ProcessListView: Send + Sync {
    /// Apply `query` and return the view's outcome (a page name or rendered list).
    fn show(&self, query: &ProcessListQuery) -> Result<String>;
}
