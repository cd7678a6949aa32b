//! In-memory `Transport` for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{GitHubError, HttpResponse, Transport};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub token: String,
}

/// Serves canned responses keyed by URL and records every request.
/// URLs without a canned response get a 404.
#[derive(Default)]
pub struct FakeTransport {
    responses: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            HttpResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str, token: &str) -> Result<HttpResponse, GitHubError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            token: token.to_string(),
        });
        Ok(self.responses.get(url).cloned().unwrap_or(HttpResponse {
            status: 404,
            body: r#"{"message":"Not Found"}"#.to_string(),
        }))
    }
}
