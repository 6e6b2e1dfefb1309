//! Commit source capability

use crate::repository::{GitRepo, Result};
use crate::types::CommitInfo;

/// Anything that can hand out commit metadata for a range.
///
/// The changelog pipeline only depends on this trait, so tests and other
/// version-control backends can stand in for git.
pub trait CommitSource {
    /// Commits after `since`, newest first, at most `max` of them
    fn commits_since(&self, since: &str, max: Option<usize>) -> Result<Vec<CommitInfo>>;

    /// Paths touched by the commit `hash`
    fn changed_files(&self, hash: &str) -> Result<Vec<String>>;
}

impl CommitSource for GitRepo {
    fn commits_since(&self, since: &str, max: Option<usize>) -> Result<Vec<CommitInfo>> {
        GitRepo::commits_since(self, since, max)
    }

    fn changed_files(&self, hash: &str) -> Result<Vec<String>> {
        GitRepo::changed_files(self, hash)
    }
}
