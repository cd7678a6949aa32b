pub mod types;

pub use types::{Check, CheckFailure, CheckResult, CheckStatus, ValidationReport};

use colored::Colorize;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::github::{self, GitHubError, RepoId, Transport};

/// Run every preflight check against `config`.
///
/// All four checks run even when earlier ones fail, so one run reports
/// every problem. Nothing is written; the only side effect is a single
/// GET against the repository metadata endpoint.
#[instrument(skip_all)]
pub async fn run(config: &Config, transport: &dyn Transport) -> ValidationReport {
    let mut results = Vec::with_capacity(4);

    results.push(CheckResult {
        check: Check::Completeness,
        status: check_completeness(config),
    });

    let (format_status, repo) = check_repo_format(config.repo());
    results.push(CheckResult {
        check: Check::RepoFormat,
        status: format_status,
    });

    results.push(CheckResult {
        check: Check::VaultPath,
        status: check_vault_path(config.vault_path()),
    });

    let remote_status = match (config.token(), repo) {
        (None, _) => CheckStatus::Skipped("GITHUB_TOKEN is missing"),
        (_, None) => CheckStatus::Skipped("REPO is missing or invalid"),
        (Some(token), Some(repo)) => {
            check_remote_access(transport, config.api_url(), &repo, token).await
        }
    };
    results.push(CheckResult {
        check: Check::RemoteAccess,
        status: remote_status,
    });

    let report = ValidationReport { results };
    info!(passed = report.passed(), "preflight complete");
    report
}

fn check_completeness(config: &Config) -> CheckStatus {
    let missing = config.missing_fields();
    debug!(missing = missing.len(), "checked configuration values");
    if missing.is_empty() {
        CheckStatus::Passed
    } else {
        CheckStatus::Failed(missing.into_iter().map(CheckFailure::MissingField).collect())
    }
}

fn check_repo_format(repo: Option<&str>) -> (CheckStatus, Option<RepoId>) {
    let Some(raw) = repo else {
        return (CheckStatus::Skipped("REPO is missing"), None);
    };
    match RepoId::parse(raw) {
        Some(id) => (CheckStatus::Passed, Some(id)),
        None => (
            CheckStatus::Failed(vec![CheckFailure::MalformedRepo(raw.to_string())]),
            None,
        ),
    }
}

fn check_vault_path(path: Option<&Path>) -> CheckStatus {
    let Some(path) = path else {
        return CheckStatus::Skipped("VAULT_PATH is missing");
    };
    if !path.exists() {
        CheckStatus::Failed(vec![CheckFailure::VaultMissing(path.to_path_buf())])
    } else if !path.is_dir() {
        CheckStatus::Failed(vec![CheckFailure::VaultNotDirectory(path.to_path_buf())])
    } else {
        CheckStatus::Passed
    }
}

async fn check_remote_access(
    transport: &dyn Transport,
    api_url: &str,
    repo: &RepoId,
    token: &str,
) -> CheckStatus {
    let failure = match github::check_repo_access(transport, api_url, repo, token).await {
        Ok(()) => return CheckStatus::Passed,
        Err(GitHubError::RepoNotFound { repo }) => CheckFailure::RepoNotFound(repo),
        Err(GitHubError::Api { status, body }) => CheckFailure::Api { status, body },
        Err(other) => CheckFailure::Request(other.to_string()),
    };
    CheckStatus::Failed(vec![failure])
}

/// Print the report to stdout, one block per check.
pub fn print_report(report: &ValidationReport) {
    for result in &report.results {
        println!("{} {}...", "[CHECK]".bold(), result.check);
        match &result.status {
            CheckStatus::Passed => println!("  {} ok", "✔".green().bold()),
            CheckStatus::Skipped(reason) => {
                println!("  {} skipped: {}", "-".yellow().bold(), reason)
            }
            CheckStatus::Failed(failures) => {
                for failure in failures {
                    println!("  {} {}", "✘".red().bold(), failure);
                    for hint in failure.hints() {
                        println!("      {}", hint.dimmed());
                    }
                }
            }
        }
    }
    println!();

    if report.passed() {
        println!("{}", "All preflight checks passed.".green().bold());
    } else {
        println!(
            "{}",
            format!("Preflight failed with {} problem(s).", report.failures().count())
                .red()
                .bold()
        );
        println!("Fix the problems above, usually by updating your .env file.");
    }
}
