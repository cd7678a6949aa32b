use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::{ConfigError, Settings};
use crate::github::{self, GitHubError, Issue, Transport};
use crate::vault::{self, VaultError, WriteOutcome};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// Result of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Issues rendered into the note, pull requests excluded.
    pub issues: usize,
    /// Pull requests dropped from the fetched records.
    pub skipped_pull_requests: usize,
    pub write: WriteOutcome,
}

/// Fetch, filter, render and persist the issues note for `today`.
///
/// Any fetch error aborts before the vault is touched.
#[instrument(skip_all, fields(repo = %settings.repo, date = %today))]
pub async fn run(
    settings: &Settings,
    transport: &dyn Transport,
    today: NaiveDate,
) -> Result<SyncOutcome, SyncError> {
    info!("fetching issues from GitHub");
    let fetched = github::fetch_issues(transport, &settings.api_url, &settings.repo, &settings.token).await?;
    info!(records = fetched.len(), "fetched issue records");

    let total = fetched.len();
    let issues = retain_issues(fetched);
    let skipped_pull_requests = total - issues.len();

    let document = vault::render_document(&issues, today);
    let write = vault::write_if_changed(&settings.vault_path, &document)?;
    match &write {
        WriteOutcome::Written(path) => info!(path = %path.display(), "issues note updated"),
        WriteOutcome::Unchanged(path) => info!(path = %path.display(), "no changes detected"),
    }

    Ok(SyncOutcome {
        issues: issues.len(),
        skipped_pull_requests,
        write,
    })
}

/// Drop pull requests, keeping the API order of everything else.
pub fn retain_issues(records: Vec<Issue>) -> Vec<Issue> {
    records
        .into_iter()
        .filter(|issue| {
            if issue.is_pull_request {
                debug!(number = ?issue.number, "skipping pull request");
            }
            !issue.is_pull_request
        })
        .collect()
}
