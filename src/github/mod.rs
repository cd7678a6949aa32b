pub mod types;

#[cfg(test)]
pub mod fake;

pub use types::{HttpResponse, Issue, RepoId};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub repository not found: {repo}")]
    RepoNotFound { repo: String },

    #[error("GitHub API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode GitHub response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected GitHub response: {0}")]
    UnexpectedShape(String),
}

/// Performs authenticated GET requests against the GitHub API.
///
/// Implementations return the status and body of any completed request,
/// including non-2xx ones; status handling is left to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, token: &str) -> Result<HttpResponse, GitHubError>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, token: &str) -> Result<HttpResponse, GitHubError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", "issue-sync")
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

fn repo_url(api_url: &str, repo: &RepoId) -> String {
    format!(
        "{}/repos/{}/{}",
        api_url.trim_end_matches('/'),
        repo.owner,
        repo.name
    )
}

/// Confirm the repository metadata endpoint is readable with `token`.
///
/// A 404 maps to `RepoNotFound`, any other non-2xx status to `Api`.
#[instrument(skip(transport, repo, token), fields(repo = %repo))]
pub async fn check_repo_access(
    transport: &dyn Transport,
    api_url: &str,
    repo: &RepoId,
    token: &str,
) -> Result<(), GitHubError> {
    let url = repo_url(api_url, repo);
    debug!(url = %url, "requesting repository metadata");
    let response = transport.get(&url, token).await?;
    debug!(status = response.status, "repository metadata response");

    match response.status {
        _ if response.is_success() => Ok(()),
        404 => Err(GitHubError::RepoNotFound {
            repo: repo.to_string(),
        }),
        status => Err(GitHubError::Api {
            status,
            body: response.body,
        }),
    }
}

/// Fetch the first page of the repository's open issues.
///
/// Pull requests are still included here; filtering is the caller's job.
#[instrument(skip(transport, repo, token), fields(repo = %repo))]
pub async fn fetch_issues(
    transport: &dyn Transport,
    api_url: &str,
    repo: &RepoId,
    token: &str,
) -> Result<Vec<Issue>, GitHubError> {
    let url = format!("{}/issues", repo_url(api_url, repo));
    debug!(url = %url, "fetching issues");
    let response = transport.get(&url, token).await?;
    debug!(status = response.status, "issues response");

    if !response.is_success() {
        return Err(GitHubError::Api {
            status: response.status,
            body: response.body,
        });
    }

    let records = match serde_json::from_str::<Value>(&response.body)? {
        Value::Array(records) => records,
        other => {
            return Err(GitHubError::UnexpectedShape(format!(
                "expected a JSON array of issues, got {}",
                json_kind(&other)
            )))
        }
    };
    debug!(count = records.len(), "retrieved issue records");

    let mut issues = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match Issue::from_value(record) {
            Some(issue) => issues.push(issue),
            None => warn!(index, kind = json_kind(record), "skipping malformed issue record"),
        }
    }
    Ok(issues)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
