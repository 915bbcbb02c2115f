//! Example: List a DisBox folder
//!
//! Usage:
//!   cargo run --example ls -- --webhook WEBHOOK_URL [--path "folder/sub"]

use disbox::{DisboxClient, Node, format_size};
use std::env;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let mut webhook = None;
    let mut path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--webhook" | "-w" => {
                webhook = args.get(i + 1).cloned();
                i += 2;
            }
            "--path" => {
                path = args.get(i + 1).cloned();
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let webhook = webhook.expect("--webhook is required");
    let client = DisboxClient::new(&webhook).expect("Invalid webhook URL");

    println!("📁 Listing: {}\n", path.as_deref().unwrap_or("/"));

    match client.fetch_tree(path.as_deref()).await {
        Ok(level) => {
            if level.is_empty() {
                println!("  (empty)");
            }
            for (name, node) in level.iter() {
                match node {
                    Node::File(file) => {
                        println!("  📄 {} [{}] {}", name, file.id, format_size(file.size))
                    }
                    Node::Directory(dir) => println!("  📁 {} ({} entries)", name, dir.children.len()),
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to list: {}", e);
        }
    }
}
