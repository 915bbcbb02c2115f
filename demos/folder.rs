//! Example: Download a whole folder
//!
//! Usage:
//!   cargo run --example folder -- <WEBHOOK_URL> <FOLDER> [--force] [--parallel N]

use std::env;

use disbox::{ClientConfig, DisboxClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let webhook = args.get(1).expect("Usage: folder <WEBHOOK_URL> <FOLDER> [--force] [--parallel N]");
    let folder = args.get(2).expect("Usage: folder <WEBHOOK_URL> <FOLDER> [--force] [--parallel N]");
    let force = args.iter().any(|a| a == "--force");

    let mut config = ClientConfig::default();
    if let Some(pos) = args.iter().position(|a| a == "--parallel") {
        let limit: usize = args.get(pos + 1).ok_or("--parallel needs a value")?.parse()?;
        config = config.with_max_concurrent_downloads(limit);
    }

    let client = DisboxClient::with_config(webhook, config)?;

    println!("Downloading {}...", folder);
    let outcomes = client.download_folder(folder, force).await?;

    let fetched = outcomes.iter().filter(|o| o.was_downloaded()).count();
    println!(
        "📊 {} files: {} downloaded, {} already present",
        outcomes.len(),
        fetched,
        outcomes.len() - fetched
    );

    Ok(())
}
