//! Commit classification
//!
//! Maps commit subjects onto category keys. Classification runs in strict
//! priority order: a conventional `type(scope):` prefix naming a configured
//! key wins, then a substring scan over the keys in map order, then a fixed
//! keyword fallback.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use chronicle_core::CategoryMap;
use chronicle_git::CommitInfo;

/// Conventional commit prefix: `type:` or `type(scope):`
static CONVENTIONAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)(\(.+\))?:").expect("Invalid regex"));

/// Key every commit lands in when nothing else matches
pub const DEFAULT_KEY: &str = "chore";

/// Classify a commit subject against the configured category keys
pub fn classify(message: &str, categories: &CategoryMap) -> String {
    if let Some(caps) = CONVENTIONAL_PREFIX.captures(message) {
        let commit_type = &caps[1];
        if categories.contains_key(commit_type) {
            return commit_type.to_string();
        }
    }

    let lower = message.to_lowercase();

    for key in categories.keys() {
        if lower.contains(key) || lower.contains(&key.replacen("feat", "feature", 1)) {
            return key.to_string();
        }
    }

    fallback_key(&lower).to_string()
}

fn fallback_key(lower: &str) -> &'static str {
    if lower.contains("fix") || lower.contains("bug") {
        "fix"
    } else if lower.contains("add") || lower.contains("new") {
        "feat"
    } else if lower.contains("doc") || lower.contains("readme") {
        "docs"
    } else if lower.contains("refactor") || lower.contains("clean") {
        "refactor"
    } else {
        DEFAULT_KEY
    }
}

/// Reduced rule set used when no generation capability is available
pub fn classify_simple(message: &str) -> &'static str {
    let lower = message.to_lowercase();

    if lower.contains("feat") || lower.contains("add") {
        "feat"
    } else if lower.contains("fix") || lower.contains("bug") {
        "fix"
    } else if lower.contains("doc") {
        "docs"
    } else if lower.contains("refactor") {
        "refactor"
    } else {
        DEFAULT_KEY
    }
}

/// Drop commits whose subject contains any of the exclusion patterns.
///
/// Matching is a case-insensitive substring test. Order is preserved.
pub fn filter_commits(commits: &[CommitInfo], exclude_patterns: &[String]) -> Vec<CommitInfo> {
    if exclude_patterns.is_empty() {
        return commits.to_vec();
    }

    let patterns: Vec<String> = exclude_patterns.iter().map(|p| p.to_lowercase()).collect();

    let kept: Vec<CommitInfo> = commits
        .iter()
        .filter(|commit| {
            let lower = commit.message.to_lowercase();
            !patterns.iter().any(|p| lower.contains(p.as_str()))
        })
        .cloned()
        .collect();

    debug!(
        before = commits.len(),
        after = kept.len(),
        "filtered excluded commits"
    );
    kept
}

/// Commits sharing a category key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitGroup {
    /// Category key
    pub key: String,
    /// Display label, when the key is configured
    pub label: Option<String>,
    /// Commits in this group, in input order
    pub commits: Vec<CommitInfo>,
}

/// Bucket commits by [`classify`].
///
/// Groups for configured keys come first in map order, then keys produced by
/// the keyword fallback in the order they were first seen. Empty groups are
/// omitted.
pub fn group_commits(commits: &[CommitInfo], categories: &CategoryMap) -> Vec<CommitGroup> {
    let mut groups: Vec<CommitGroup> = categories
        .iter()
        .map(|(key, label)| CommitGroup {
            key: key.to_string(),
            label: Some(label.to_string()),
            commits: Vec::new(),
        })
        .collect();

    for commit in commits {
        let key = classify(&commit.message, categories);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.commits.push(commit.clone()),
            None => groups.push(CommitGroup {
                key,
                label: None,
                commits: vec![commit.clone()],
            }),
        }
    }

    groups.retain(|g| !g.commits.is_empty());
    groups
}
