//! Example: Print a node listing as a tree
//!
//! Usage:
//!   cargo run --example tree -- [--config CONFIG] <LISTING_JSON>
//!
//! LISTING_JSON holds a JSON array of node records as returned by the drive.

mod cli;

use std::sync::Arc;

use cli::{init_tracing, load_config, usage_and_exit, ArgParser};
use cloudtree::{Client, DriveError, HttpClient, Node, NodeRef, NodeTree, Result};

const USAGE: &str = "Usage: cargo run --example tree -- [--config CONFIG] <LISTING_JSON>";

fn print_node(tree: &NodeTree, node: NodeRef, depth: usize) {
    let Some(n) = tree.get(node) else { return };
    let marker = if n.is_folder() { "/" } else { "" };
    let status = if n.available() { "" } else { " [unavailable]" };
    println!("{}{}{}{}", "  ".repeat(depth), n.name, marker, status);

    // Multi-parent nodes are printed under every parent; cap depth for cyclic data.
    if depth < 64 {
        for child in n.children() {
            print_node(tree, child, depth + 1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let mut parser = ArgParser::new(USAGE);
    let config = load_config(&mut parser);
    let positionals = parser.remaining();
    if positionals.len() != 1 {
        usage_and_exit(USAGE);
    }

    let listing = std::fs::read_to_string(&positionals[0])?;
    let nodes: Vec<Node> = serde_json::from_str(&listing).map_err(DriveError::Decoding)?;

    let client: Arc<dyn Client> = Arc::new(HttpClient::with_config(config)?);
    let tree = NodeTree::from_nodes(client, nodes);

    println!("{} nodes, {} roots", tree.len(), tree.roots().len());
    for root in tree.roots() {
        print_node(&tree, root, 0);
    }

    Ok(())
}
