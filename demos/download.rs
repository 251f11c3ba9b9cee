//! Example: Download a node's content
//!
//! Usage:
//!   cargo run --example download -- [--config CONFIG] --id NODE_ID [--size BYTES] <LOCAL_PATH>

mod cli;

use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

use cli::{init_tracing, load_config, usage_and_exit, ArgParser};
use cloudtree::{Client, HttpClient, Node, NodeTree, Result, TransferProgress};
use indicatif::{ProgressBar, ProgressStyle};

const USAGE: &str =
    "Usage: cargo run --example download -- [--config CONFIG] --id NODE_ID [--size BYTES] <LOCAL_PATH>";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let mut parser = ArgParser::new(USAGE);
    let config = load_config(&mut parser);
    let id = parser
        .take_value(&["--id"])
        .unwrap_or_else(|| usage_and_exit(USAGE));
    let size = parser
        .take_value(&["--size"])
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);
    let positionals = parser.remaining();
    if positionals.len() != 1 {
        usage_and_exit(USAGE);
    }
    let local_path = &positionals[0];

    let client: Arc<dyn Client> = Arc::new(HttpClient::with_config(config)?);
    let mut tree = NodeTree::new(client);

    let mut node = Node::new(id.clone(), local_path.clone(), "FILE");
    node.content_properties.size = size;
    let node_ref = tree.insert_root(node);

    // Pull the real name and size when the metadata endpoint is reachable.
    if let Err(e) = tree.refresh(node_ref).await {
        println!("Could not fetch metadata for {}: {}", id, e);
    }
    let Some(node) = tree.get(node_ref) else {
        return Ok(());
    };

    let progress_bar = ProgressBar::new(node.content_properties.size);
    progress_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress_bar.set_message(node.name.clone());
    let bar = progress_bar.clone();

    let mut writer = BufWriter::new(File::create(local_path)?);
    let written = node
        .download_to(
            &mut writer,
            Some(Box::new(move |progress: &TransferProgress| {
                if progress.total > 0 {
                    bar.set_length(progress.total);
                }
                bar.set_position(progress.done);
                true
            })),
        )
        .await?;
    progress_bar.finish_with_message(format!("{} complete", node.name));

    println!("Wrote {} bytes to {}", written, local_path);
    Ok(())
}
