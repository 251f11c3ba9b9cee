//! Node tree: the arena that owns every node and the client.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use reqwest::{Method, Request, Url};
use serde_json::Value;

use crate::client::Client;
use crate::error::{DriveError, Result};
use crate::fs::node::{Node, NodeRef};
use crate::fs::nodes::Nodes;

/// Every locally known node, indexed by slot and by remote id.
///
/// Parent/child links are [`NodeRef`] slots, so a node listed under several
/// parents is stored once and referenced from each of them.
pub struct NodeTree {
    client: Arc<dyn Client>,
    nodes: Vec<Node>,
    by_id: HashMap<String, NodeRef>,
    roots: Nodes,
}

impl NodeTree {
    /// Create an empty tree owning `client`.
    pub fn new(client: Arc<dyn Client>) -> Self {
        Self {
            client,
            nodes: Vec::new(),
            by_id: HashMap::new(),
            roots: Nodes::new(),
        }
    }

    /// Build a tree from a bulk listing.
    ///
    /// Every node is attached to `client`. Nodes without parents become
    /// roots; all others are linked under each listed parent that is part
    /// of the listing.
    pub fn from_nodes(client: Arc<dyn Client>, nodes: Vec<Node>) -> Self {
        let mut tree = Self::new(client);

        let refs: Vec<NodeRef> = nodes
            .into_iter()
            .map(|mut node| {
                if node.parents.is_empty() {
                    tree.insert_root(node)
                } else {
                    node.attach(&tree.client);
                    tree.insert(node)
                }
            })
            .collect();

        for node in refs {
            tree.link_parents(node);
        }

        tracing::debug!(
            "built node tree with {} nodes and {} roots",
            tree.len(),
            tree.roots.len()
        );
        tree
    }

    /// The client shared by the nodes of this tree.
    pub fn client(&self) -> &Arc<dyn Client> {
        &self.client
    }

    /// Store a node and index it by id. The first slot stored for an id
    /// keeps the index.
    pub fn insert(&mut self, node: Node) -> NodeRef {
        let node_ref = NodeRef(self.nodes.len());
        if !node.id.is_empty() {
            match self.by_id.entry(node.id.clone()) {
                Entry::Occupied(_) => {
                    tracing::warn!("duplicate node id {}, keeping the first", node.id)
                }
                Entry::Vacant(entry) => {
                    entry.insert(node_ref);
                }
            }
        }
        self.nodes.push(node);
        node_ref
    }

    /// Store a top-level node: flags it as root and attaches the client.
    pub fn insert_root(&mut self, mut node: Node) -> NodeRef {
        node.set_root(true);
        node.attach(&self.client);
        let node_ref = self.insert(node);
        self.roots.push(node_ref);
        node_ref
    }

    pub fn get(&self, node: NodeRef) -> Option<&Node> {
        self.nodes.get(node.0)
    }

    pub fn get_mut(&mut self, node: NodeRef) -> Option<&mut Node> {
        self.nodes.get_mut(node.0)
    }

    /// Slot indexed for a remote id.
    pub fn find(&self, id: &str) -> Option<NodeRef> {
        self.by_id.get(id).copied()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Node> {
        self.find(id).and_then(|node| self.get(node))
    }

    /// Top-level nodes, in insertion order.
    pub fn roots(&self) -> &Nodes {
        &self.roots
    }

    /// The first root, which for a single drive is the drive's root folder.
    pub fn root(&self) -> Option<&Node> {
        self.roots.get(0).and_then(|node| self.get(node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeRef(i), node))
    }

    /// Locally attached children of `node`, resolved to nodes.
    pub fn children(&self, node: NodeRef) -> Vec<&Node> {
        self.get(node)
            .map(|n| n.children().iter().filter_map(|c| self.get(c)).collect())
            .unwrap_or_default()
    }

    /// Attach `child` under `parent` and hand it the parent's client.
    pub fn add_child(&mut self, parent: NodeRef, child: NodeRef) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;

        if parent == child {
            let node = &mut self.nodes[parent.0];
            tracing::debug!("adding {} under itself", node.name);
            node.children.push(child);
            return Ok(());
        }

        let (parent_node, child_node) = self.pair_mut(parent, child);
        parent_node.add_child(child, child_node);
        Ok(())
    }

    /// Detach the first occurrence of `child` from `parent`.
    ///
    /// Returns `Ok(false)` without touching anything when `child` is not
    /// attached there.
    pub fn remove_child(&mut self, parent: NodeRef, child: NodeRef) -> Result<bool> {
        let parent_node = self.get_mut(parent).ok_or(DriveError::UnknownNode(parent.0))?;
        Ok(parent_node.remove_child(child))
    }

    /// Attach `node` under every loaded parent listed in its `parents`.
    ///
    /// Parents that already hold the node are skipped.
    ///
    /// # Returns
    /// Number of parents the node was newly attached to
    pub fn link(&mut self, node: NodeRef) -> Result<usize> {
        self.check(node)?;
        Ok(self.link_parents(node))
    }

    /// Merge a fresh metadata record into the tree.
    ///
    /// A record whose id is already known is merged into that slot, keeping
    /// its children, and the node is moved to match its new `parents`.
    /// Otherwise the record is stored as a new node and linked.
    pub fn apply(&mut self, record: Node) -> Result<NodeRef> {
        if let Some(existing) = self.find(&record.id) {
            self.nodes[existing.0].update(&record)?;
            self.relink(existing);
            return Ok(existing);
        }

        let node_ref = if record.parents.is_empty() {
            self.insert_root(record)
        } else {
            let mut record = record;
            record.attach(&self.client);
            self.insert(record)
        };
        self.link_parents(node_ref);
        Ok(node_ref)
    }

    /// Fetch the node's metadata and merge it into its slot.
    ///
    /// A record naming a different `id` is rejected with
    /// [`DriveError::IdMismatch`] so the id index stays valid.
    pub async fn refresh(&mut self, node: NodeRef) -> Result<()> {
        let id = self
            .get(node)
            .ok_or(DriveError::UnknownNode(node.0))?
            .id
            .clone();
        let client = self.client.clone();

        let url = client.metadata_url(&format!("nodes/{}", id));
        let url = Url::parse(&url)
            .map_err(|e| DriveError::RequestConstruction(format!("{}: {}", url, e)))?;

        let response = client.execute(Request::new(Method::GET, url)).await?;
        client.check_response(&response)?;
        let body = response.bytes().await?;
        let record: Value = serde_json::from_slice(&body).map_err(|e| {
            tracing::error!("error decoding the node from JSON: {}", e);
            DriveError::Decoding(e)
        })?;

        if let Some(found) = record.get("id").and_then(Value::as_str) {
            if found != id {
                tracing::warn!("refresh of {} returned node {}", id, found);
                return Err(DriveError::IdMismatch {
                    expected: id,
                    found: found.to_string(),
                });
            }
        }

        self.nodes[node.0].update(&record)?;
        self.relink(node);
        Ok(())
    }

    /// Path of a node, following the first loaded parent up to a root.
    pub fn path(&self, node: NodeRef) -> Option<String> {
        self.get(node)?;
        Some(self.build_path(node, 0))
    }

    fn build_path(&self, node: NodeRef, depth: usize) -> String {
        let current = &self.nodes[node.0];

        // Guard against parent cycles in bad data.
        if depth > 100 || current.is_root() {
            return format!("/{}", current.name);
        }

        let parent = current.parents.iter().find_map(|id| self.find(id));
        match parent {
            Some(parent) => {
                let parent_path = self.build_path(parent, depth + 1);
                format!("{}/{}", parent_path.trim_end_matches('/'), current.name)
            }
            None => format!("/{}", current.name),
        }
    }

    fn link_parents(&mut self, node: NodeRef) -> usize {
        let parents = self.nodes[node.0].parents.clone();
        let mut linked = 0;

        for parent_id in &parents {
            let Some(parent) = self.find(parent_id) else {
                tracing::debug!("parent {} of {} is not loaded", parent_id, self.nodes[node.0].id);
                continue;
            };
            if self.nodes[parent.0].children.contains(node) {
                continue;
            }
            if parent == node {
                self.nodes[node.0].children.push(node);
            } else {
                let (parent_node, child_node) = self.pair_mut(parent, node);
                parent_node.add_child(node, child_node);
            }
            linked += 1;
        }

        linked
    }

    /// Detach `node` from parents it no longer lists, then link it under the new ones.
    fn relink(&mut self, node: NodeRef) {
        let parents = self.nodes[node.0].parents.clone();
        for holder in self.nodes.iter_mut() {
            if holder.children.contains(node) && !parents.contains(&holder.id) {
                holder.remove_child(node);
            }
        }
        self.link_parents(node);
    }

    fn check(&self, node: NodeRef) -> Result<()> {
        if node.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(DriveError::UnknownNode(node.0))
        }
    }

    /// Two distinct slots borrowed mutably at once. `a` and `b` must differ.
    fn pair_mut(&mut self, a: NodeRef, b: NodeRef) -> (&mut Node, &mut Node) {
        if a.0 < b.0 {
            let (left, right) = self.nodes.split_at_mut(b.0);
            (&mut left[a.0], &mut right[0])
        } else {
            let (left, right) = self.nodes.split_at_mut(a.0);
            (&mut right[0], &mut left[b.0])
        }
    }
}

impl std::fmt::Debug for NodeTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTree")
            .field("nodes", &self.nodes.len())
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}
