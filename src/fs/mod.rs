//! Remote tree types and the operations built on them.

pub(crate) mod node;
mod operations;

pub use node::{Directory, DirectoryNode, FileEntry, FileRef, Node, NodeType, parse_chunk_refs};
pub use operations::browse::{find_file, level_files};
pub use operations::download::DownloadOutcome;
pub use operations::tree::resolve_folder;
