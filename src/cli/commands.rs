//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: back up the metadata of every process matching a filter
//! - list: show which processes a filter selects

use clap::{Parser, Subcommand};
use metabackup::domain::StatusFilter;
use std::path::PathBuf;

/// metabackup - timestamped snapshots of process metadata files
#[derive(Parser, Debug)]
#[command(name = "metabackup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Process registry file, overrides the configured path
    #[arg(short, long, global = true)]
    pub registry: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Back up metadata files of all processes matching the filter
    Run {
        /// Filter expression, overrides the configured filter
        #[arg(short, long)]
        filter: Option<String>,

        /// Number of most recent results to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// After the run, list the processes with this outcome (OK, ERROR, or "" for all)
        #[arg(short, long)]
        show: Option<StatusFilter>,
    },

    /// List the processes a filter selects without backing anything up
    List {
        /// Filter expression, overrides the configured filter
        #[arg(short, long)]
        filter: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use metabackup::domain::BackupStatus;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["metabackup"]).is_err());
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from([
            "metabackup",
            "-v",
            "-c",
            "/etc/metabackup.yml",
            "run",
            "--registry",
            "/srv/processes.jsonl",
        ])
        .unwrap();
        assert!(cli.is_verbose());
        assert_eq!(cli.config, Some(PathBuf::from("/etc/metabackup.yml")));
        assert_eq!(cli.registry, Some(PathBuf::from("/srv/processes.jsonl")));
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["metabackup", "run"]).unwrap();
        match cli.command {
            Commands::Run { filter, limit, show } => {
                assert!(filter.is_none());
                assert!(limit.is_none());
                assert!(show.is_none());
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_run_with_options() {
        let cli = Cli::try_parse_from([
            "metabackup",
            "run",
            "--filter",
            "id:5 9 12",
            "--limit",
            "2",
            "--show",
            "error",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { filter, limit, show } => {
                assert_eq!(filter.as_deref(), Some("id:5 9 12"));
                assert_eq!(limit, Some(2));
                assert_eq!(show, Some(StatusFilter::Only(BackupStatus::Error)));
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_run_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["metabackup", "run", "--show", "maybe"]).is_err());
    }

    #[test]
    fn test_list_command() {
        let cli = Cli::try_parse_from(["metabackup", "list", "-f", "atlas"]).unwrap();
        match cli.command {
            Commands::List { filter } => assert_eq!(filter.as_deref(), Some("atlas")),
            _ => panic!("Expected list command"),
        }
    }
}
