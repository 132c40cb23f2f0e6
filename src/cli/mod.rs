//! CLI module for metabackup - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for running a backup and
//! previewing which processes a filter selects.

pub mod commands;

pub use commands::Cli;
