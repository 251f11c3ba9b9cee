//! In-memory client used by the unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Request, Response};

use crate::client::Client;
use crate::error::{DriveError, Result};

pub(crate) struct MockClient {
    pub base: String,
    pub status: u16,
    pub content: Vec<u8>,
    pub metadata: String,
    pub fail_execute: bool,
    pub requests: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            base: "http://drive.test".to_string(),
            status: 200,
            content: Vec::new(),
            metadata: "{}".to_string(),
            fail_execute: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_content(mut self, content: &[u8]) -> Self {
        self.content = content.to_vec();
        self
    }

    pub fn with_metadata(mut self, metadata: &str) -> Self {
        self.metadata = metadata.to_string();
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Client for MockClient {
    fn metadata_url(&self, path: &str) -> String {
        format!("{}/metadata/{}", self.base, path)
    }

    fn content_url(&self, path: &str) -> String {
        format!("{}/content/{}", self.base, path)
    }

    async fn execute(&self, request: Request) -> Result<Response> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("{} {}", request.method(), request.url()));

        if self.fail_execute {
            return Err(DriveError::RequestExecution("connection refused".into()));
        }

        let body = if request.url().path().ends_with("/content") {
            self.content.clone()
        } else {
            self.metadata.clone().into_bytes()
        };

        let response = ::http::Response::builder()
            .status(self.status)
            .body(body)
            .map_err(|e| DriveError::RequestExecution(Box::new(e)))?;
        Ok(response.into())
    }

    fn check_response(&self, response: &Response) -> Result<()> {
        if !response.status().is_success() {
            return Err(DriveError::HttpError(response.status().as_u16()));
        }
        Ok(())
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }
}
