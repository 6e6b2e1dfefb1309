//! Commit history operations

use chrono::{TimeZone, Utc};
use git2::{DiffOptions, Oid, Sort};
use tracing::{debug, instrument, warn};

use chronicle_core::config::LAST_TAG;

use crate::repository::{GitRepo, Result};
use crate::types::CommitInfo;

/// Cap applied when there is no tag to start from
const UNTAGGED_LIMIT: usize = 100;

/// Cap applied when the requested range cannot be resolved
const UNRESOLVED_LIMIT: usize = 10;

impl GitRepo {
    /// Get commits reachable from HEAD but not from `since`, newest first.
    ///
    /// `since` may be a tag, any revspec git understands (`HEAD~10`, a hash),
    /// or [`LAST_TAG`]. Without any tag every commit is considered,
    /// capped at 100. A revspec that does not resolve falls back to the most
    /// recent commits.
    #[instrument(skip(self))]
    pub fn commits_since(&self, since: &str, max: Option<usize>) -> Result<Vec<CommitInfo>> {
        let boundary = if since == LAST_TAG {
            match self.find_latest_tag()? {
                Some(tag) => {
                    debug!(tag = %tag.name, "resolved last tag");
                    Some(self.resolve_commit(&tag.name)?)
                }
                None => {
                    warn!("no git tags found, analyzing all commits");
                    return self.walk(None, Some(max.unwrap_or(UNTAGGED_LIMIT)));
                }
            }
        } else {
            match self.resolve_commit(since) {
                Ok(oid) => Some(oid),
                Err(e) => {
                    warn!(since, error = %e, "range query failed, getting recent commits instead");
                    return self.walk(None, Some(max.unwrap_or(UNRESOLVED_LIMIT)));
                }
            }
        };

        self.walk(boundary, max)
    }

    /// Paths touched by a commit, relative to the repository root
    pub fn changed_files(&self, hash: &str) -> Result<Vec<String>> {
        let commit = self.repo.find_commit(Oid::from_str(hash)?)?;
        self.files_of(&commit)
    }

    fn resolve_commit(&self, spec: &str) -> Result<Oid> {
        let object = self.repo.revparse_single(spec)?;
        Ok(object.peel_to_commit()?.id())
    }

    fn walk(&self, hide: Option<Oid>, limit: Option<usize>) -> Result<Vec<CommitInfo>> {
        let head = self.head_commit()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head.id())?;
        if let Some(oid) = hide {
            revwalk.hide(oid)?;
        }

        let mut commits = Vec::new();

        for oid in revwalk.take(limit.unwrap_or(usize::MAX)) {
            let commit = self.repo.find_commit(oid?)?;
            let files = self.files_of(&commit).unwrap_or_else(|e| {
                warn!(hash = %commit.id(), error = %e, "could not get changed files");
                Vec::new()
            });
            commits.push(commit_to_info(&commit).with_files(files));
        }

        debug!(count = commits.len(), "collected commits");
        Ok(commits)
    }

    fn files_of(&self, commit: &git2::Commit<'_>) -> Result<Vec<String>> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };

        let mut opts = DiffOptions::new();
        let diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

        let files = diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(|p| p.to_string_lossy().into_owned())
            })
            .collect();

        Ok(files)
    }
}

/// Convert a git2 Commit to CommitInfo
fn commit_to_info(commit: &git2::Commit<'_>) -> CommitInfo {
    let hash = commit.id().to_string();
    let author = commit.author();

    let message = commit.summary().unwrap_or("(no message)").to_string();

    let body = commit.body().map(|b| b.to_string());

    let timestamp = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now);

    CommitInfo::new(
        hash,
        message,
        author.name().unwrap_or("Unknown"),
        author.email().unwrap_or("unknown@example.com"),
        timestamp,
    )
    .with_body(body.unwrap_or_default())
}
