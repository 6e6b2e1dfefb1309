//! Commit-to-entry pipeline

use tracing::{info, instrument, warn};

use chronicle_core::error::ChangelogError;
use chronicle_core::Result;
use chronicle_git::{CommitInfo, CommitSource};

use crate::classifier::filter_commits;
use crate::synth::{Synthesis, Synthesizer};

/// What to generate an entry for
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    /// Range start: a tag, a revspec, or `last-tag`
    pub since: &'a str,
    /// Cap on commits read from history
    pub max_commits: Option<usize>,
    /// Version label for the entry
    pub version: Option<&'a str>,
}

/// A generated entry with the commits it was built from
#[derive(Debug, Clone)]
pub struct Generated {
    pub synthesis: Synthesis,
    pub commits: Vec<CommitInfo>,
}

impl Generated {
    /// Number of commits that went into the entry
    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }
}

/// Read commits for the range and drop excluded ones.
///
/// Fails with [`ChangelogError::NoCommitsFound`] when the range is empty and
/// [`ChangelogError::NoCommitsAfterFilter`] when nothing survives the filter.
#[instrument(skip(source, exclude_patterns))]
pub fn collect_commits(
    source: &dyn CommitSource,
    since: &str,
    max_commits: Option<usize>,
    exclude_patterns: &[String],
) -> Result<Vec<CommitInfo>> {
    let commits = source.commits_since(since, max_commits)?;
    if commits.is_empty() {
        warn!(since, "no commits found");
        return Err(ChangelogError::NoCommitsFound {
            since: since.to_string(),
        }
        .into());
    }

    let commits = filter_commits(&commits, exclude_patterns);
    if commits.is_empty() {
        warn!("no relevant commits found after filtering");
        return Err(ChangelogError::NoCommitsAfterFilter.into());
    }

    Ok(commits)
}

/// Collect commits and synthesize one entry from them
#[instrument(skip(source, synthesizer))]
pub async fn generate(
    source: &dyn CommitSource,
    synthesizer: &Synthesizer,
    request: GenerateRequest<'_>,
) -> Result<Generated> {
    let commits = collect_commits(
        source,
        request.since,
        request.max_commits,
        &synthesizer.config().exclude_patterns,
    )?;
    info!(count = commits.len(), "generating changelog entry");

    let synthesis = synthesizer.synthesize(&commits, request.version).await?;
    Ok(Generated { synthesis, commits })
}
