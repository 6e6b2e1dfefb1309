//! Deterministic rendering used when the generation capability is unavailable

use chrono::NaiveDate;

use chronicle_core::CategoryMap;
use chronicle_git::CommitInfo;

use crate::classifier::classify_simple;
use crate::formatter::{ChangelogFormatter, MarkdownFormatter};
use crate::types::{ChangelogEntry, Section};

/// Render commits as changelog markdown without a generation capability.
///
/// Commits are bucketed with [`classify_simple`]. Buckets appear in the order
/// their first commit was seen, titled with the configured label or
/// `🔧 <key>` when the key is not configured.
pub fn render_fallback(
    commits: &[CommitInfo],
    categories: &CategoryMap,
    version: Option<&str>,
    date: NaiveDate,
) -> String {
    let mut buckets: Vec<(&'static str, Section)> = Vec::new();

    for commit in commits {
        let key = classify_simple(&commit.message);
        let index = match buckets.iter().position(|(k, _)| *k == key) {
            Some(index) => index,
            None => {
                let title = categories
                    .get(key)
                    .map(String::from)
                    .unwrap_or_else(|| format!("🔧 {}", key));
                buckets.push((key, Section::new(title)));
                buckets.len() - 1
            }
        };
        buckets[index].1.add_item(commit.message.as_str());
    }

    let mut entry = ChangelogEntry::new(version.map(String::from), date);
    entry.sections = buckets.into_iter().map(|(_, section)| section).collect();

    MarkdownFormatter::new().format(&entry).trim().to_string()
}
