use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use metabackup::backup::{BatchRunner, RunPhase, RunSummary};
use metabackup::domain::{BackupOutcome, BackupStatus, StatusFilter};
use metabackup::host::{
    ChannelSink, ListMode, ProcessListQuery, ProcessListView, ProcessRegistry, RegistryListView,
};
use metabackup::storage::LocalStorage;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

type Runner = BatchRunner<ProcessRegistry, ProcessRegistry, LocalStorage>;

fn setup_logging(default_level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("metabackup")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("metabackup.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn open_registry(cli: &Cli, config: &Config) -> Result<Arc<ProcessRegistry>> {
    let path = cli.registry.clone().unwrap_or_else(|| config.registry.path.clone());
    let registry = ProcessRegistry::open(&path)
        .context(format!("Failed to open process registry {}", path.display()))?;
    Ok(Arc::new(registry))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Run { filter, limit, show } => {
            handle_run_command(cli, config, filter.as_deref(), *limit, *show).await
        }
        Commands::List { filter } => handle_list_command(cli, config, filter.as_deref()),
    }
}

async fn handle_run_command(
    cli: &Cli,
    config: &Config,
    filter: Option<&str>,
    limit: Option<usize>,
    show: Option<StatusFilter>,
) -> Result<()> {
    let registry = open_registry(cli, config)?;
    let runner: Runner = BatchRunner::with_config(
        registry.clone(),
        registry.clone(),
        Arc::new(LocalStorage::new()),
        config.runner_config(),
    );
    if let Some(filter) = filter {
        runner.set_filter(filter);
    }
    if let Some(limit) = limit {
        runner.set_limit(limit)?;
    }

    let (sink, mut updates) = ChannelSink::channel();
    runner.set_notification_sink(Some(Arc::new(sink)));

    let handle = runner.execute().await.context("Failed to start backup run")?;
    println!(
        "{} {} processes (filter: '{}')",
        "Backing up:".green(),
        runner.total(),
        runner.filter()
    );

    let wait = handle.wait();
    tokio::pin!(wait);
    let mut cancel_requested = false;

    let summary = loop {
        tokio::select! {
            summary = &mut wait => break summary?,
            Some(_) = updates.recv() => print_progress(&runner),
            _ = tokio::signal::ctrl_c(), if !cancel_requested => {
                cancel_requested = true;
                println!("{}", "Cancelling after the current process...".yellow());
                runner.cancel();
            }
        }
    };

    // The final notification may still be queued
    while updates.try_recv().is_ok() {}
    print_progress(&runner);

    print_results(&runner.results_limited(), runner.limit());
    print_summary(&summary);

    if let Some(status) = show {
        let view = RegistryListView::new(registry);
        let listing = runner.show_in_process_list(status, &view)?;
        print!("{}", listing);
    }

    Ok(())
}

fn handle_list_command(cli: &Cli, config: &Config, filter: Option<&str>) -> Result<()> {
    let registry = open_registry(cli, config)?;
    let filter = filter.unwrap_or(&config.backup.filter).to_string();
    info!("Listing processes for filter '{}'", filter);

    let view = RegistryListView::new(registry);
    let listing = view.show(&ProcessListQuery {
        filter,
        mode: ListMode::Current,
    })?;
    print!("{}", listing);
    Ok(())
}

fn print_progress(runner: &Runner) {
    println!(
        "[{:>3}%] {}/{} processed",
        runner.progress(),
        runner.processed(),
        runner.total()
    );
}

fn print_results(results: &[BackupOutcome], limit: usize) {
    if results.is_empty() {
        return;
    }
    println!("{}", format!("Latest {} results:", limit).cyan());
    for outcome in results {
        let status = match outcome.status {
            BackupStatus::Ok => outcome.status.as_str().green(),
            BackupStatus::Error => outcome.status.as_str().red(),
        };
        if outcome.message.is_empty() {
            println!("  {:>5} {:>8}  {}", status, outcome.process_id, outcome.process_title);
        } else {
            println!(
                "  {:>5} {:>8}  {}: {}",
                status, outcome.process_id, outcome.process_title, outcome.message
            );
        }
    }
}

fn print_summary(summary: &RunSummary) {
    let label = match summary.phase {
        RunPhase::Cancelled => "Cancelled:".yellow(),
        _ if summary.errors > 0 => "Finished with errors:".red(),
        _ => "Finished:".green(),
    };
    println!(
        "{} {}/{} processed, {} ok, {} failed",
        label, summary.processed, summary.total, summary.ok, summary.errors
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging once the configured level is known
    setup_logging(config.log_level.as_deref().unwrap_or("info"))
        .context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
