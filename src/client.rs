//! Transport collaborator used by nodes for further requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Request, Response};

use crate::error::Result;

/// Capabilities a node needs from the component that talks to the drive.
///
/// Nodes only hold a `Weak<dyn Client>`; the [`NodeTree`](crate::fs::NodeTree)
/// (or the caller) owns the client.
#[async_trait]
pub trait Client: Send + Sync {
    /// Resolve a node-relative path (e.g. `nodes/<id>`) against the metadata endpoint.
    fn metadata_url(&self, path: &str) -> String;

    /// Resolve a node-relative path (e.g. `nodes/<id>/content`) against the content endpoint.
    fn content_url(&self, path: &str) -> String;

    /// Execute a request and return the raw response.
    async fn execute(&self, request: Request) -> Result<Response>;

    /// Validate a response status.
    fn check_response(&self, response: &Response) -> Result<()>;

    /// Configured request timeout. Advisory only.
    fn timeout(&self) -> Duration;
}
