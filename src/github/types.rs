use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;

static REPO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_-]+)/([A-Za-z0-9_.-]+)$").expect("repo pattern is valid")
});

/// A repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// Parse an `owner/name` identifier. Full URLs, missing slashes and
    /// extra path segments are rejected.
    pub fn parse(value: &str) -> Option<RepoId> {
        let caps = REPO_PATTERN.captures(value)?;
        Some(RepoId {
            owner: caps[1].to_string(),
            name: caps[2].to_string(),
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Status and body of a completed HTTP request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One record from the issues endpoint.
///
/// Every field is optional: the renderer substitutes placeholders instead
/// of rejecting incomplete records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Issue {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub html_url: Option<String>,
    /// Set when the record carries a `pull_request` key.
    pub is_pull_request: bool,
}

impl Issue {
    /// Build an issue from a raw JSON record. Returns `None` for anything
    /// that is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Issue> {
        let obj = value.as_object()?;
        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        Some(Issue {
            number: obj.get("number").and_then(Value::as_u64),
            title: text("title"),
            body: text("body"),
            html_url: text("html_url"),
            is_pull_request: obj.contains_key("pull_request"),
        })
    }
}
