//! Shared helpers for filesystem operations.

use std::path::{Component, Path, PathBuf};

use crate::error::{DisboxError, Result};

/// Split a remote folder path into its segments, ignoring empty ones.
pub(crate) fn folder_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Local path a file named `name` is written to.
///
/// The name comes from the server and must be a single plain path component; anything
/// that could land outside `to_folder` (separators, `..`, roots, drive prefixes) is refused.
pub(crate) fn target_path(to_folder: Option<&Path>, name: &str) -> Result<PathBuf> {
    let mut components = Path::new(name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !plain || name.contains(['/', '\\']) {
        return Err(DisboxError::MalformedResponse(format!(
            "unsafe file name from server: {:?}",
            name
        )));
    }

    Ok(match to_folder {
        Some(folder) => folder.join(name),
        None => PathBuf::from(name),
    })
}
