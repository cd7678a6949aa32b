mod config;
mod github;
mod preflight;
mod sync;
mod vault;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, info_span};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::github::{ReqwestTransport, Transport};
use crate::vault::WriteOutcome;

/// issue-sync: copies the open issues of a GitHub repository into a
/// Markdown note inside a local vault.
#[derive(Parser, Debug)]
#[command(name = "issue-sync", version, about)]
struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Read settings from this TOML file instead of ./.issue-sync.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the preflight checks only
    Check,
    /// Sync issues without running the preflight checks
    Sync,
    /// Run the preflight checks, then sync if they all pass (default)
    Run,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run);
    let _main_span = info_span!("issue_sync", command = ?command).entered();

    match execute(&cli, command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {}", "[FATAL]".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: &Cli, command: Command) -> Result<bool, sync::SyncError> {
    info!("loading configuration");
    let config = config::Config::load(cli.env_file.as_deref(), cli.config.as_deref())?;
    let transport = ReqwestTransport::new();
    let today = chrono::Local::now().date_naive();

    execute_with(&config, &transport, command, today).await
}

/// Run `command` against an already loaded config.
///
/// Returns `Ok(false)` when preflight fails, `Err` on a fatal sync error.
/// The sync only starts once every preflight check has passed.
async fn execute_with(
    config: &Config,
    transport: &dyn Transport,
    command: Command,
    today: NaiveDate,
) -> Result<bool, sync::SyncError> {
    if command != Command::Sync {
        info!("running preflight checks");
        let report = preflight::run(config, transport).await;
        preflight::print_report(&report);
        if !report.passed() {
            return Ok(false);
        }
        if command == Command::Check {
            return Ok(true);
        }
        println!();
    }

    let settings = config.settings()?;
    let outcome = sync::run(&settings, transport, today).await?;

    match &outcome.write {
        WriteOutcome::Written(path) => println!(
            "{} Issues note updated: {} ({} issues)",
            "[INFO]".green().bold(),
            path.display(),
            outcome.issues
        ),
        WriteOutcome::Unchanged(_) => println!(
            "{} No changes detected. Skipping update.",
            "[INFO]".green().bold()
        ),
    }
    info!(
        issues = outcome.issues,
        skipped_pull_requests = outcome.skipped_pull_requests,
        "done"
    );
    Ok(true)
}
