//! Drive node types.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::Client;
use crate::error::{DriveError, Result};
use crate::fs::nodes::Nodes;

/// Handle to a node slot inside a [`NodeTree`](crate::fs::NodeTree).
///
/// Two handles are equal only when they name the same in-memory node, even
/// if two slots happen to carry the same remote `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub(crate) usize);

impl NodeRef {
    /// Slot index inside the owning tree.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Node kind as reported by the drive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Regular file with content
    File,
    /// Folder
    Folder,
    /// Asset (e.g. a photo derived from a file)
    Asset,
    /// Any other kind, kept verbatim
    Other(String),
    /// Not reported
    #[default]
    Unset,
}

impl NodeKind {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::File => "FILE",
            NodeKind::Folder => "FOLDER",
            NodeKind::Asset => "ASSET",
            NodeKind::Other(s) => s,
            NodeKind::Unset => "",
        }
    }

    fn is_unset(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "FILE" => NodeKind::File,
            "FOLDER" => NodeKind::Folder,
            "ASSET" => NodeKind::Asset,
            "" => NodeKind::Unset,
            _ => NodeKind::Other(s),
        }
    }
}

impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        NodeKind::from(s.to_string())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node status. Only `AVAILABLE` has meaning to the node graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeStatus {
    Available,
    Trash,
    Purged,
    Pending,
    Other(String),
    #[default]
    Unset,
}

impl NodeStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            NodeStatus::Available => "AVAILABLE",
            NodeStatus::Trash => "TRASH",
            NodeStatus::Purged => "PURGED",
            NodeStatus::Pending => "PENDING",
            NodeStatus::Other(s) => s,
            NodeStatus::Unset => "",
        }
    }

    fn is_unset(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl From<String> for NodeStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "AVAILABLE" => NodeStatus::Available,
            "TRASH" => NodeStatus::Trash,
            "PURGED" => NodeStatus::Purged,
            "PENDING" => NodeStatus::Pending,
            "" => NodeStatus::Unset,
            _ => NodeStatus::Other(s),
        }
    }
}

impl From<&str> for NodeStatus {
    fn from(s: &str) -> Self {
        NodeStatus::from(s.to_string())
    }
}

impl From<NodeStatus> for String {
    fn from(status: NodeStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// Content metadata. Only meaningful for file nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentProperties {
    #[serde(skip_serializing_if = "is_zero")]
    pub version: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub extension: String,
    /// Content size in bytes
    #[serde(skip_serializing_if = "is_zero")]
    pub size: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub md5: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_date: Option<DateTime<Utc>>,
}

impl ContentProperties {
    fn is_empty(&self) -> bool {
        self == &ContentProperties::default()
    }
}

/// A file or folder entry of the remote drive.
///
/// Fields coming from the drive are serialised with the drive's JSON keys.
/// `children`, `root` and the client back-reference are local to this
/// process and never travel over the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Node {
    /// Remote identifier (immutable once assigned)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "NodeKind::is_unset")]
    pub kind: NodeKind,
    /// IDs of every parent; a node may live in several folders.
    #[serde(
        rename = "Parents",
        alias = "parents",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub parents: Vec<String>,
    #[serde(skip_serializing_if = "NodeStatus::is_unset")]
    pub status: NodeStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "is_zero")]
    pub version: u64,
    /// Short-lived direct download link
    #[serde(skip_serializing_if = "String::is_empty")]
    pub temp_link: String,
    #[serde(skip_serializing_if = "ContentProperties::is_empty")]
    pub content_properties: ContentProperties,

    #[serde(skip)]
    pub(crate) children: Nodes,
    #[serde(skip)]
    pub(crate) root: bool,
    #[serde(skip)]
    pub(crate) client: Option<Weak<dyn Client>>,
}

impl Node {
    /// Create a node with an id, name and kind.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<NodeKind>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Decode a node from a JSON metadata record.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(DriveError::Decoding)
    }

    /// Decode a node from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(DriveError::Decoding)
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Check if the node is available (neither trashed nor pending).
    pub fn available(&self) -> bool {
        self.status == NodeStatus::Available
    }

    /// Whether this is a top-level node of the drive.
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Mark or unmark this node as a top-level node.
    pub fn set_root(&mut self, root: bool) {
        self.root = root;
    }

    /// Locally attached children, in insertion order.
    pub fn children(&self) -> &Nodes {
        &self.children
    }

    /// The client used for further requests, if it is still alive.
    pub fn client(&self) -> Option<Arc<dyn Client>> {
        self.client.as_ref().and_then(Weak::upgrade)
    }

    /// Attach a client without taking ownership of it.
    pub fn attach(&mut self, client: &Arc<dyn Client>) {
        self.client = Some(Arc::downgrade(client));
    }

    /// Whether this node and `other` hold the same client.
    pub fn shares_client_with(&self, other: &Node) -> bool {
        match (&self.client, &other.client) {
            (Some(a), Some(b)) => Weak::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Add a child: appends `child_ref` to the children list and hands the
    /// child this node's client. Duplicates are not checked.
    pub fn add_child(&mut self, child_ref: NodeRef, child: &mut Node) {
        tracing::debug!("adding {} under {}", child.name, self.name);
        self.children.push(child_ref);
        child.client = self.client.clone();
    }

    /// Remove the first occurrence of `child_ref` from the children list.
    ///
    /// Removing a child that is not attached is a no-op. The child keeps
    /// its metadata and client.
    pub fn remove_child(&mut self, child_ref: NodeRef) -> bool {
        let found = self.children.remove(child_ref);
        tracing::debug!(
            "removing {} from {}: {}",
            child_ref.index(),
            self.name,
            found
        );
        found
    }
}

/// Metadata for a node about to be created or changed remotely.
///
/// Used as the source of a merge, never as its target: it has no identity,
/// status, timestamps or content properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNode {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "NodeKind::is_unset")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl NewNode {
    /// Create a record with a name and kind.
    pub fn new(name: impl Into<String>, kind: impl Into<NodeKind>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Add a parent id.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Add a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Set a custom property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
