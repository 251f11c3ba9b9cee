//! # cloudtree
//!
//! Client-side model of a remote cloud drive.
//!
//! ## Features
//!
//! - **Node graph**: files and folders as [`Node`] values stored once in a
//!   [`NodeTree`] arena, linked by [`NodeRef`] so a node may sit under
//!   several parents.
//! - **Metadata merge**: [`Node::update`] applies fresher server records in
//!   place while keeping locally cached children, the root flag and the
//!   client link.
//! - **Content retrieval**: [`Node::download`] opens a byte stream through
//!   the node's [`Client`]; [`Node::download_to`] writes it out with
//!   progress reporting.
//! - **Transport**: [`Client`] is the seam to the drive; [`HttpClient`] is a
//!   reqwest implementation configured by [`ClientConfig`].
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cloudtree::{Client, ClientConfig, HttpClient, Node, NodeTree};
//!
//! # async fn example() -> cloudtree::Result<()> {
//! let client: Arc<dyn Client> = Arc::new(HttpClient::with_config(ClientConfig::default())?);
//! let listing = std::fs::read_to_string("nodes.json")?;
//! let nodes: Vec<Node> = serde_json::from_str(&listing).map_err(cloudtree::DriveError::Decoding)?;
//!
//! let tree = NodeTree::from_nodes(client, nodes);
//! if let Some(root) = tree.roots().get(0) {
//!     for child in tree.children(root) {
//!         println!("{} ({})", child.name, child.kind);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod fs;
pub mod http;
pub mod progress;

// Re-export commonly used types
pub use client::Client;
pub use config::ClientConfig;
pub use error::{DriveError, Result};
pub use fs::{
    ContentProperties, ContentStream, NewNode, Node, NodeKind, NodeRef, NodeStatus, NodeTree, Nodes,
};
pub use http::HttpClient;
pub use progress::{ProgressCallback, TransferProgress};
