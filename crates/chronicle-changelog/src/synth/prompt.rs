//! Prompt construction for the generation capability

use chrono::NaiveDate;

use chronicle_core::CategoryMap;
use chronicle_git::CommitInfo;

use crate::types::LATEST_LABEL;

/// Files listed per commit before the rest are summarized
const MAX_LISTED_FILES: usize = 5;

/// Inputs for a changelog-drafting prompt
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    /// Project display name
    pub project: &'a str,
    /// Version being released, if any
    pub version: Option<&'a str>,
    /// Entry date
    pub date: NaiveDate,
    /// Commits to describe, newest first
    pub commits: &'a [CommitInfo],
    /// Category keys and their display labels
    pub categories: &'a CategoryMap,
    /// List changed files under each commit
    pub include_files: bool,
}

/// One commit as it appears in the prompt
pub fn format_commit(commit: &CommitInfo, include_files: bool) -> String {
    let mut formatted = format!("{}: {}", commit.short_hash, commit.message);

    if include_files && !commit.files.is_empty() {
        let listed: Vec<&str> = commit
            .files
            .iter()
            .take(MAX_LISTED_FILES)
            .map(String::as_str)
            .collect();
        formatted.push_str(&format!("\n  Files: {}", listed.join(", ")));

        if commit.files.len() > MAX_LISTED_FILES {
            formatted.push_str(&format!(
                " (+{} more)",
                commit.files.len() - MAX_LISTED_FILES
            ));
        }
    }

    formatted
}

/// Build the prompt. Output is fully determined by the input.
pub fn build_prompt(input: &PromptInput<'_>) -> String {
    let commits_text = input
        .commits
        .iter()
        .enumerate()
        .map(|(i, commit)| format!("{}. {}", i + 1, format_commit(commit, input.include_files)))
        .collect::<Vec<_>>()
        .join("\n");

    let categories_text = input
        .categories
        .iter()
        .map(|(key, label)| format!("- {}: {}", key, label))
        .collect::<Vec<_>>()
        .join("\n");

    let version_line = input
        .version
        .map(|v| format!("VERSION: {}\n", v))
        .unwrap_or_default();

    let heading = format!(
        "## {} - {}",
        input.version.unwrap_or(LATEST_LABEL),
        input.date.format("%Y-%m-%d")
    );

    let example_sections = input
        .categories
        .iter()
        .take(3)
        .map(|(_, label)| format!("### {}\n- Description of the change based on commits", label))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a technical writer creating a changelog for developers.

PROJECT: {project}
{version_line}
Given these git commits, create a concise changelog entry:

COMMITS:
{commits_text}

CATEGORIES TO USE:
{categories_text}

INSTRUCTIONS:
- Group changes by category (only include categories that have changes)
- Use bullet points for each change
- Focus on user-facing changes and impact
- Use present tense (\"Add feature\" not \"Added feature\")
- Be concise but descriptive
- Mention breaking changes clearly if any
- Ignore merge commits and version bumps
- If a commit doesn't fit a category, put it in the most appropriate one

FORMAT YOUR RESPONSE EXACTLY LIKE THIS:

{heading}

{example_sections}

(Only include sections that have actual changes)

IMPORTANT:
- Only output the markdown changelog, no other text
- Start directly with the ## heading
- Only include categories that have actual changes from the commits",
        project = input.project,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chronicle_core::config::default_categories;

    fn commit(hash: &str, message: &str, files: &[&str]) -> CommitInfo {
        CommitInfo::new(hash, message, "Test", "test@example.com", Utc::now())
            .with_files(files.iter().map(|f| f.to_string()).collect())
    }

    #[test]
    fn test_format_commit_with_files() {
        let c = commit(
            "abcdef0123456789",
            "feat: add search",
            &["a.rs", "b.rs", "c.rs", "d.rs", "e.rs", "f.rs", "g.rs"],
        );
        assert_eq!(
            format_commit(&c, true),
            "abcdef01: feat: add search\n  Files: a.rs, b.rs, c.rs, d.rs, e.rs (+2 more)"
        );
        assert_eq!(format_commit(&c, false), "abcdef01: feat: add search");
    }

    #[test]
    fn test_build_prompt() {
        let categories = default_categories();
        let commits = vec![
            commit("1111111122222222", "fix: null pointer", &["ptr.rs"]),
            commit("3333333344444444", "feat: add search", &[]),
        ];
        let input = PromptInput {
            project: "demo",
            version: Some("v1.2.0"),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            commits: &commits,
            categories: &categories,
            include_files: true,
        };

        let prompt = build_prompt(&input);
        assert!(prompt.contains("PROJECT: demo\nVERSION: v1.2.0\n"));
        assert!(prompt.contains("1. 11111111: fix: null pointer\n  Files: ptr.rs\n2. 33333333: feat: add search"));
        assert!(prompt.contains("- feat: ✨ New Features"));
        assert!(prompt.contains("## v1.2.0 - 2024-01-15"));
        assert_eq!(prompt, build_prompt(&input));
    }

    #[test]
    fn test_build_prompt_without_version() {
        let categories = default_categories();
        let input = PromptInput {
            project: "demo",
            version: None,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            commits: &[],
            categories: &categories,
            include_files: false,
        };

        let prompt = build_prompt(&input);
        assert!(!prompt.contains("VERSION:"));
        assert!(prompt.contains("## Latest Changes - 2024-01-15"));
    }
}
