//! Node graph: nodes, collections, merging, downloads and the tree arena.

mod download;
mod merge;
pub(crate) mod node;
pub(crate) mod nodes;
#[cfg(test)]
pub(crate) mod testing;
mod tree;

pub use download::ContentStream;
pub use node::{ContentProperties, NewNode, Node, NodeKind, NodeRef, NodeStatus};
pub use nodes::Nodes;
pub use tree::NodeTree;
