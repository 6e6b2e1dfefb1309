//! Chronicle Git - Commit history for changelog synthesis
//!
//! This crate reads commit metadata, changed files and version tags from a
//! git repository, and exposes them through the [`CommitSource`] capability.

mod commits;
mod repository;
mod source;
mod tags;
pub mod types;

pub use repository::{default_identity, GitRepo, Result};
pub use source::CommitSource;
pub use types::{CommitInfo, TagInfo};
