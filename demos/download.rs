//! Example: Download a file by id or name
//!
//! Usage:
//!   cargo run --example download -- <WEBHOOK_URL> <FILE_ID_OR_NAME> [FROM_FOLDER] [TO_FOLDER]

use std::env;
use std::path::Path;
use std::sync::Arc;

use disbox::{DisboxClient, DownloadOutcome, FileRef, TransferProgress};

#[tokio::main]
async fn main() -> disbox::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: download <WEBHOOK_URL> <FILE_ID_OR_NAME> [FROM_FOLDER] [TO_FOLDER]");
        std::process::exit(1);
    }

    let file = match args[2].parse::<i64>() {
        Ok(id) => FileRef::ById(id),
        Err(_) => FileRef::ByName(args[2].clone()),
    };
    let from_folder = args.get(3).map(String::as_str);
    let to_folder = args.get(4).map(Path::new);

    let mut client = DisboxClient::new(&args[1])?;
    client.watch_status(Arc::new(|progress: &TransferProgress| {
        print!(
            "\r{} {:.1}% ({}/{} bytes)",
            progress.filename,
            progress.percent(),
            progress.done,
            progress.total
        );
        if progress.is_complete() {
            println!();
        }
        true
    }));

    match client.download_file(file, from_folder, to_folder, false).await? {
        DownloadOutcome::Downloaded { path, size } => {
            println!("Saved {} ({})", path.display(), disbox::format_size(size))
        }
        DownloadOutcome::AlreadyExists { path } => {
            println!("{} already exists", path.display())
        }
    }

    Ok(())
}
