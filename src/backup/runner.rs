//! Batch runner - backs up every process matching a filter on a background task.
//!
//! A run moves `Idle -> Running -> Completed | Cancelled`. `execute()` resolves
//! the process ids, spawns exactly one task and returns a `RunHandle` right
//! away. The task handles processes strictly one after another:
//! 1. Stops before the next process once cancellation was requested
//! 2. Fetches the process and copies its artifacts
//! 3. Records the outcome and advances progress
//! 4. Notifies the UI, throttled to one signal per interval
//!
//! When the loop ends the run is marked finished, the task waits a short grace
//! delay so a trailing UI poll sees the terminal state, then sends one final
//! notification.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::copier::ArtifactCopier;
use super::progress::ProgressTracker;
use super::result_log::ResultLog;
use super::throttle::Throttle;
use crate::domain::{BackupOutcome, ProcessId, StatusFilter};
use crate::error::{MetaBackupError, Result};
use crate::host::{
    ListMode, NotificationSink, ProcessFilter, ProcessListQuery, ProcessListView, ProcessStore,
    QueryFlags,
};
use crate::storage::FileStorage;

/// Event name sent to the notification sink.
pub const UPDATE_EVENT: &str = "update";

type SharedSink = Arc<RwLock<Option<Arc<dyn NotificationSink>>>>;

/// Configuration for the BatchRunner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Number of outcomes in the limited result view
    pub limit: usize,
    /// Filter expression resolved at the start of each run
    pub filter: String,
    /// Minimum time between two progress notifications
    pub notify_interval: Duration,
    /// Wait between the end of a run and the final notification
    pub grace_delay: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            filter: String::new(),
            notify_interval: Duration::from_millis(1000),
            grace_delay: Duration::from_millis(200),
        }
    }
}

/// Lifecycle of the most recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No run started yet
    Idle,
    Running,
    /// Every resolved process was visited
    Completed,
    /// Stopped early on request
    Cancelled,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Completed | RunPhase::Cancelled)
    }
}

/// State shared between the runner and its background task.
#[derive(Debug)]
pub struct RunState {
    running: AtomicBool,
    phase: Mutex<RunPhase>,
    progress: ProgressTracker,
    log: ResultLog,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            running: AtomicBool::new(false),
            phase: Mutex::new(RunPhase::Idle),
            progress: ProgressTracker::new(),
            log: ResultLog::new(),
        }
    }
}

impl RunState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> RunPhase {
        *self.phase.lock()
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn log(&self) -> &ResultLog {
        &self.log
    }

    /// Claim the state for a new run. Fails if one is in flight.
    fn begin(&self) -> Result<()> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| MetaBackupError::AlreadyRunning)?;
        *self.phase.lock() = RunPhase::Running;
        self.log.clear();
        self.progress.start(0);
        Ok(())
    }

    fn finish(&self, phase: RunPhase) {
        *self.phase.lock() = phase;
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub phase: RunPhase,
    pub total: usize,
    pub processed: usize,
    pub ok: usize,
    pub errors: usize,
}

/// Handle to a spawned run.
#[derive(Debug)]
pub struct RunHandle {
    cancel: CancellationToken,
    interrupt: CancellationToken,
    handle: JoinHandle<RunSummary>,
}

impl RunHandle {
    /// Stop before the next process. The process being copied finishes.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel and also cut the trailing grace delay short.
    ///
    /// An interrupted run sends no final notification.
    pub fn interrupt(&self) {
        self.interrupt.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to end.
    pub async fn wait(self) -> Result<RunSummary> {
        self.handle
            .await
            .map_err(|e| MetaBackupError::Task(e.to_string()))
    }
}

/// The iteration half of a run, moved into the spawned task.
struct RunTask<P: ProcessStore, S: FileStorage> {
    ids: Vec<ProcessId>,
    store: Arc<P>,
    copier: Arc<ArtifactCopier<S>>,
    state: Arc<RunState>,
    sink: SharedSink,
    notify_interval: Duration,
    grace_delay: Duration,
    cancel: CancellationToken,
    interrupt: CancellationToken,
}

impl<P: ProcessStore, S: FileStorage> RunTask<P, S> {
    async fn run(self) -> RunSummary {
        let guard = FinishGuard::new(self.state.clone());
        let mut throttle = Throttle::new(self.notify_interval);
        let mut ok = 0;
        let mut errors = 0;
        // Cancelled while the filter was still resolving
        let mut phase = if self.cancel.is_cancelled() {
            RunPhase::Cancelled
        } else {
            RunPhase::Completed
        };

        for &id in &self.ids {
            if self.cancel.is_cancelled() {
                phase = RunPhase::Cancelled;
                break;
            }

            let outcome = self.backup_one(id).await;
            if outcome.is_ok() {
                ok += 1;
            } else {
                errors += 1;
                tracing::warn!(process_id = id, error = %outcome.message, "Process backup failed");
            }

            self.state.log.append(outcome);
            self.state.progress.advance();

            if throttle.ready() {
                notify(&self.sink);
            }
        }

        let summary = RunSummary {
            phase,
            total: self.ids.len(),
            processed: self.state.progress.processed(),
            ok,
            errors,
        };
        guard.finish(phase);
        log::info!(
            "Backup run {:?}: {}/{} processed, {} ok, {} failed",
            phase,
            summary.processed,
            summary.total,
            ok,
            errors
        );

        tokio::select! {
            biased;
            _ = self.interrupt.cancelled() => {
                log::warn!("Backup run interrupted during final wait, skipping last notification");
                return summary;
            }
            _ = tokio::time::sleep(self.grace_delay) => {}
        }
        notify(&self.sink);

        summary
    }

    /// Fetch and back up one process; lookup failures become error outcomes.
    async fn backup_one(&self, id: ProcessId) -> BackupOutcome {
        match self.store.get(id).await {
            Ok(Some(process)) => self.copier.backup(&process).await,
            Ok(None) => {
                BackupOutcome::error(id, "", MetaBackupError::ProcessNotFound(id).to_string())
            }
            Err(e) => BackupOutcome::error(id, "", e.to_string()),
        }
    }
}

/// Closes the run as `Cancelled` if the task unwinds or is aborted before
/// reaching its normal end.
struct FinishGuard {
    state: Arc<RunState>,
    armed: bool,
}

impl FinishGuard {
    fn new(state: Arc<RunState>) -> Self {
        Self { state, armed: true }
    }

    fn finish(mut self, phase: RunPhase) {
        self.armed = false;
        self.state.finish(phase);
    }
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        if self.armed {
            log::error!("Backup run ended abnormally, marking it cancelled");
            self.state.finish(RunPhase::Cancelled);
        }
    }
}

fn notify(sink: &SharedSink) {
    let sink = sink.read().clone();
    if let Some(sink) = sink {
        sink.send(UPDATE_EVENT);
    }
}

/// Runs metadata backups over a filtered set of processes.
pub struct BatchRunner<F, P, S>
where
    F: ProcessFilter,
    P: ProcessStore,
    S: FileStorage,
{
    /// Resolves the filter expression to process ids
    filter: Arc<F>,
    /// Loads processes by id
    store: Arc<P>,
    copier: Arc<ArtifactCopier<S>>,
    state: Arc<RunState>,
    sink: SharedSink,
    config: RwLock<RunnerConfig>,
    /// Cancellation for the current run
    cancel: Mutex<Option<CancellationToken>>,
}

impl<F, P, S> BatchRunner<F, P, S>
where
    F: ProcessFilter + 'static,
    P: ProcessStore + 'static,
    S: FileStorage + 'static,
{
    /// Create a runner with default configuration.
    pub fn new(filter: Arc<F>, store: Arc<P>, storage: Arc<S>) -> Self {
        Self::with_config(filter, store, storage, RunnerConfig::default())
    }

    /// Create a runner with custom configuration.
    pub fn with_config(
        filter: Arc<F>,
        store: Arc<P>,
        storage: Arc<S>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            filter,
            store,
            copier: Arc::new(ArtifactCopier::new(storage)),
            state: Arc::new(RunState::default()),
            sink: Arc::new(RwLock::new(None)),
            config: RwLock::new(config),
            cancel: Mutex::new(None),
        }
    }

    /// Start a run and return without waiting for it.
    ///
    /// `cancel()` takes effect as soon as this is called, including while the
    /// filter is still resolving; such a run ends `Cancelled` with nothing
    /// processed.
    ///
    /// Fails with `AlreadyRunning` while another run is in flight, and with the
    /// filter's error if the process ids cannot be resolved. In the latter case
    /// the run is closed right away and the final notification is still sent.
    pub async fn execute(&self) -> Result<RunHandle> {
        self.state.begin()?;

        let interrupt = CancellationToken::new();
        let cancel = interrupt.child_token();
        *self.cancel.lock() = Some(cancel.clone());

        let config = self.config.read().clone();
        log::info!("Starting backup run with filter '{}'", config.filter);

        let ids = match self.filter.resolve(&config.filter, QueryFlags::BACKUP).await {
            Ok(ids) => ids,
            Err(e) => {
                log::error!("Failed to resolve filter '{}': {}", config.filter, e);
                self.state.finish(RunPhase::Completed);
                notify(&self.sink);
                return Err(e);
            }
        };
        self.state.progress.start(ids.len());
        log::info!("Filter matched {} processes", ids.len());

        let task = RunTask {
            ids,
            store: self.store.clone(),
            copier: self.copier.clone(),
            state: self.state.clone(),
            sink: self.sink.clone(),
            notify_interval: config.notify_interval,
            grace_delay: config.grace_delay,
            cancel: cancel.clone(),
            interrupt: interrupt.clone(),
        };
        let handle = tokio::spawn(task.run());

        Ok(RunHandle {
            cancel,
            interrupt,
            handle,
        })
    }

    /// Ask the current run to stop before its next process.
    pub fn cancel(&self) {
        if let Some(token) = self.cancel.lock().as_ref() {
            log::info!("Cancelling backup run");
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase()
    }

    /// Progress of the current run in percent.
    pub fn progress(&self) -> u8 {
        self.state.progress.percent()
    }

    pub fn total(&self) -> usize {
        self.state.progress.total()
    }

    pub fn processed(&self) -> usize {
        self.state.progress.processed()
    }

    /// All outcomes of the current run, newest first.
    pub fn results(&self) -> Vec<BackupOutcome> {
        self.state.log.full()
    }

    /// The newest outcomes, at most `limit` of them.
    pub fn results_limited(&self) -> Vec<BackupOutcome> {
        self.state.log.capped(self.limit())
    }

    /// Shared run state, for observers that outlive a borrow of the runner.
    pub fn state(&self) -> Arc<RunState> {
        self.state.clone()
    }

    pub fn limit(&self) -> usize {
        self.config.read().limit
    }

    pub fn set_limit(&self, limit: usize) -> Result<()> {
        if limit == 0 {
            return Err(MetaBackupError::InvalidConfig(
                "result limit must be positive".to_string(),
            ));
        }
        self.config.write().limit = limit;
        Ok(())
    }

    pub fn filter(&self) -> String {
        self.config.read().filter.clone()
    }

    /// Filter for the next run; a run in progress keeps its resolved ids.
    pub fn set_filter(&self, filter: impl Into<String>) {
        self.config.write().filter = filter.into();
    }

    /// Install or remove the notification sink. Takes effect immediately,
    /// including for a run in progress.
    pub fn set_notification_sink(&self, sink: Option<Arc<dyn NotificationSink>>) {
        *self.sink.write() = sink;
    }

    /// Filter expression selecting the processes whose outcome matches `status`.
    pub fn process_list_query(&self, status: StatusFilter) -> ProcessListQuery {
        let ids: Vec<String> = self
            .state
            .log
            .ids_where(status)
            .iter()
            .map(|id| id.to_string())
            .collect();
        ProcessListQuery {
            filter: format!("\"id:{}\"", ids.join(" ")),
            mode: ListMode::Current,
        }
    }

    /// Hand the processes with a matching outcome over to the process list.
    pub fn show_in_process_list(
        &self,
        status: StatusFilter,
        view: &dyn ProcessListView,
    ) -> Result<String> {
        let query = self.process_list_query(status);
        log::debug!("Showing process list for {}", query.filter);
        view.show(&query)
    }
}
