//! Filesystem operations split into focused modules.

pub(crate) mod browse;
pub(crate) mod download;
pub(crate) mod tree;
mod update;
mod utils;
