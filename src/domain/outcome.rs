//! Per-process backup outcome types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::process::{Process, ProcessId};

/// Whether a process was backed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BackupStatus {
    Ok,
    Error,
}

impl BackupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupStatus::Ok => "OK",
            BackupStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of backing up a single process. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupOutcome {
    pub process_title: String,
    pub process_id: ProcessId,
    pub status: BackupStatus,
    /// Failure detail; empty unless `status` is `Error`
    pub message: String,
}

impl BackupOutcome {
    /// Successful backup of `process`.
    pub fn ok(process: &Process) -> Self {
        Self {
            process_title: process.title.clone(),
            process_id: process.id,
            status: BackupStatus::Ok,
            message: String::new(),
        }
    }

    /// Failed backup; `title` may be empty when the process could not be loaded.
    pub fn error(
        process_id: ProcessId,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            process_title: title.into(),
            process_id,
            status: BackupStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == BackupStatus::Ok
    }
}

/// Status selection for result lookups. `All` matches every outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(BackupStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: BackupStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "ALL" => Ok(StatusFilter::All),
            "OK" => Ok(StatusFilter::Only(BackupStatus::Ok)),
            "ERROR" => Ok(StatusFilter::Only(BackupStatus::Error)),
            other => Err(format!("unknown status '{}', expected OK or ERROR", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_outcome_has_empty_message() {
        let process = Process::new(9, "Newspaper 1901", "/data/9/meta.xml");
        let outcome = BackupOutcome::ok(&process);
        assert_eq!(outcome.process_id, 9);
        assert_eq!(outcome.process_title, "Newspaper 1901");
        assert!(outcome.is_ok());
        assert!(outcome.message.is_empty());
    }

    #[test]
    fn test_error_outcome() {
        let outcome = BackupOutcome::error(3, "", "Process not found: 3");
        assert_eq!(outcome.status, BackupStatus::Error);
        assert_eq!(outcome.message, "Process not found: 3");
        assert!(!outcome.is_ok());
    }

    #[test]
    fn test_status_serializes_as_host_strings() {
        assert_eq!(serde_json::to_string(&BackupStatus::Ok).unwrap(), "\"OK\"");
        assert_eq!(serde_json::to_string(&BackupStatus::Error).unwrap(), "\"ERROR\"");
        assert_eq!(BackupStatus::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("ok".parse::<StatusFilter>().unwrap(), StatusFilter::Only(BackupStatus::Ok));
        assert_eq!(
            "ERROR".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(BackupStatus::Error)
        );
        assert!("broken".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_status_filter_matches() {
        assert!(StatusFilter::All.matches(BackupStatus::Ok));
        assert!(StatusFilter::All.matches(BackupStatus::Error));
        assert!(!StatusFilter::Only(BackupStatus::Ok).matches(BackupStatus::Error));
    }
}
