use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::Field;

/// The four preflight checks, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Completeness,
    RepoFormat,
    VaultPath,
    RemoteAccess,
}

impl Check {
    pub fn title(self) -> &'static str {
        match self {
            Check::Completeness => "Checking configuration values",
            Check::RepoFormat => "Validating REPO format",
            Check::VaultPath => "Validating VAULT_PATH",
            Check::RemoteAccess => "Verifying GitHub repository access",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A single problem found by a check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckFailure {
    #[error("{0} is missing")]
    MissingField(Field),

    #[error("Invalid REPO format: {0}")]
    MalformedRepo(String),

    #[error("VAULT_PATH does not exist: {}", .0.display())]
    VaultMissing(PathBuf),

    #[error("VAULT_PATH is not a directory: {}", .0.display())]
    VaultNotDirectory(PathBuf),

    #[error("GitHub repository not found (404): {0}")]
    RepoNotFound(String),

    #[error("GitHub API error: {status}")]
    Api { status: u16, body: String },

    #[error("GitHub API request failed: {0}")]
    Request(String),
}

impl CheckFailure {
    /// Remediation lines shown under the failure.
    pub fn hints(&self) -> Vec<String> {
        match self {
            CheckFailure::MissingField(Field::Token) => vec![
                "Add your GitHub personal access token to .env:".to_string(),
                "  GITHUB_TOKEN=ghp_your_token_here".to_string(),
            ],
            CheckFailure::MissingField(Field::Repo) => vec![
                "Add the target repository as owner/name to .env:".to_string(),
                "  REPO=yourusername/yourrepo".to_string(),
            ],
            CheckFailure::MissingField(Field::VaultPath) => vec![
                "Add the full path to your vault folder to .env:".to_string(),
                "  VAULT_PATH=/path/to/vault".to_string(),
            ],
            CheckFailure::MalformedRepo(_) => vec![
                "Expected owner/name (not a URL). Example:".to_string(),
                "  REPO=octocat/Hello-World".to_string(),
            ],
            CheckFailure::VaultMissing(_) => vec![
                "Make sure the path is correct and the folder exists.".to_string(),
            ],
            CheckFailure::VaultNotDirectory(_) => vec![
                "Make sure VAULT_PATH points to a folder, not a file.".to_string(),
            ],
            CheckFailure::RepoNotFound(repo) => vec![
                format!("Check that the REPO name is correct: {}", repo),
                "If it is a private repository, make sure your token has repo scope.".to_string(),
            ],
            CheckFailure::Api { body, .. } => vec![
                "Double-check your token and repository name.".to_string(),
                format!("Details: {}", body),
            ],
            CheckFailure::Request(_) => vec![
                "Check your network connection and GITHUB_API_URL.".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Passed,
    Failed(Vec<CheckFailure>),
    /// Not run because an earlier check already rejected its input.
    Skipped(&'static str),
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub check: Check,
    pub status: CheckStatus,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }
}

/// Outcome of a full preflight run.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub results: Vec<CheckResult>,
}

impl ValidationReport {
    /// True only when every check passed. Skipped checks count as failures.
    pub fn passed(&self) -> bool {
        self.results.iter().all(CheckResult::passed)
    }

    #[cfg(test)]
    pub fn status(&self, check: Check) -> Option<&CheckStatus> {
        self.results
            .iter()
            .find(|r| r.check == check)
            .map(|r| &r.status)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckFailure> {
        self.results
            .iter()
            .filter_map(|r| match &r.status {
                CheckStatus::Failed(failures) => Some(failures),
                _ => None,
            })
            .flatten()
    }
}
