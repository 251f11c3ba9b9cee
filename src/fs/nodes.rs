//! Ordered node collections.

use std::ops::Index;

use crate::fs::node::NodeRef;

/// Ordered list of node references.
///
/// Used for a node's children (insertion order is display order) and for
/// bulk results, where order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nodes(Vec<NodeRef>);

impl Nodes {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reference. The same reference may be pushed more than once.
    pub fn push(&mut self, node: NodeRef) {
        self.0.push(node);
    }

    /// Remove the first entry equal to `node`, keeping the order of the rest.
    ///
    /// Returns `false` and leaves the collection untouched if `node` is absent.
    pub fn remove(&mut self, node: NodeRef) -> bool {
        match self.0.iter().position(|n| *n == node) {
            Some(i) => {
                self.0.remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove the entry at `index`, if there is one.
    pub fn remove_at(&mut self, index: usize) -> Option<NodeRef> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the collection has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entry at `index`, if there is one.
    pub fn get(&self, index: usize) -> Option<NodeRef> {
        self.0.get(index).copied()
    }

    /// Whether `node` appears at least once.
    pub fn contains(&self, node: NodeRef) -> bool {
        self.0.contains(&node)
    }

    /// Iterate over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.0.iter().copied()
    }

    /// The entries as a slice.
    pub fn as_slice(&self) -> &[NodeRef] {
        &self.0
    }
}

impl Index<usize> for Nodes {
    type Output = NodeRef;

    fn index(&self, index: usize) -> &NodeRef {
        &self.0[index]
    }
}

impl FromIterator<NodeRef> for Nodes {
    fn from_iter<I: IntoIterator<Item = NodeRef>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Nodes {
    type Item = NodeRef;
    type IntoIter = std::vec::IntoIter<NodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Nodes {
    type Item = NodeRef;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeRef>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
