//! Error types for the cloudtree library.

use thiserror::Error;

/// Main error type for cloudtree operations.
#[derive(Error, Debug)]
pub enum DriveError {
    /// A download request could not be built (bad URL or method).
    #[error("error creating the HTTP request: {0}")]
    RequestConstruction(String),

    /// The transport failed while executing a request.
    #[error("error doing the HTTP request: {0}")]
    RequestExecution(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The record being merged could not be encoded to JSON.
    #[error("error encoding to JSON: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The merged JSON could not be decoded back into a node.
    #[error("error decoding from JSON: {0}")]
    Decoding(#[source] serde_json::Error),

    /// A fetched record belongs to a different node than the one refreshed.
    #[error("node id mismatch: expected {expected}, got {found}")]
    IdMismatch { expected: String, found: String },

    /// HTTP request failed with status code.
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Network request error.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Local I/O error (writing downloaded content, reading config).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The node's collaborator has been dropped or was never attached.
    #[error("node is not attached to a client")]
    Detached,

    /// A node reference that the tree never issued.
    #[error("unknown node reference: {0}")]
    UnknownNode(usize),

    /// A transfer was cancelled by its progress callback.
    #[error("transfer cancelled by user")]
    Cancelled,

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for cloudtree operations.
pub type Result<T> = std::result::Result<T, DriveError>;
