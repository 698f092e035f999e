//! CLI command implementations

pub mod completions;
pub mod init;
pub mod library;
pub mod org;
