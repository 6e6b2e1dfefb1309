//! Fragment types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use chronicle_core::error::FragmentError;

use super::front_matter;

/// Longest accepted fragment title, in characters
pub const MAX_TITLE_LEN: usize = 100;

/// Longest slug used in a fragment file name
pub const MAX_SLUG_LEN: usize = 50;

/// Author name recorded when git has none configured
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Starting text offered for a fragment's description
pub const DESCRIPTION_TEMPLATE: &str =
    "More detailed explanation of the change...\n\n## Related\n- Closes #\n- Related to #";

/// Starting text offered for a breaking-change narrative
pub const BREAKING_TEMPLATE: &str = "## Breaking Changes\n\n### What changed\n- \n\n### Migration guide\n- \n\n### Example\n```\n// Before\n\n// After\n```";

/// Kind of change a fragment describes, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentCategory {
    Added,
    Changed,
    Deprecated,
    Removed,
    Fixed,
    Security,
}

impl FragmentCategory {
    /// Every category, in display order
    pub const ALL: [FragmentCategory; 6] = [
        Self::Added,
        Self::Changed,
        Self::Deprecated,
        Self::Removed,
        Self::Fixed,
        Self::Security,
    ];

    /// Key used in front matter
    pub fn key(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Changed => "changed",
            Self::Deprecated => "deprecated",
            Self::Removed => "removed",
            Self::Fixed => "fixed",
            Self::Security => "security",
        }
    }

    /// Heading used in the changelog document
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "✨ Added",
            Self::Changed => "🔄 Changed",
            Self::Deprecated => "⚠️ Deprecated",
            Self::Removed => "🗑️ Removed",
            Self::Fixed => "🐛 Fixed",
            Self::Security => "🔒 Security",
        }
    }

    /// One-line explanation shown when choosing a category
    pub fn description(&self) -> &'static str {
        match self {
            Self::Added => "New features, endpoints, or capabilities",
            Self::Changed => "Changes to existing functionality",
            Self::Deprecated => "Features marked for removal in future versions",
            Self::Removed => "Removed features or endpoints",
            Self::Fixed => "Bug fixes",
            Self::Security => "Security improvements or fixes",
        }
    }
}

impl fmt::Display for FragmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FragmentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| {
                let keys: Vec<_> = Self::ALL.iter().map(|c| c.key()).collect();
                format!("unknown category '{}' (expected one of: {})", s, keys.join(", "))
            })
    }
}

/// File-name slug for a title.
///
/// Lowercases, drops everything but ASCII letters, digits, whitespace and
/// hyphens, turns whitespace runs into single hyphens, and keeps at most
/// [`MAX_SLUG_LEN`] characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    let mut in_whitespace = false;

    for c in title.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
            in_whitespace = false;
        }
    }

    slug.chars().take(MAX_SLUG_LEN).collect()
}

/// Backing file name of a fragment created on `date`
pub fn fragment_file_name(date: NaiveDate, title: &str) -> String {
    format!("{}-{}.md", date.format("%Y-%m-%d"), slugify(title))
}

/// Who wrote a fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl FragmentAuthor {
    /// Create an author from optional git identity parts
    pub fn new(name: Option<String>, email: Option<String>) -> Self {
        Self { name, email }
    }
}

/// Everything needed to write a new fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDraft {
    pub category: FragmentCategory,
    pub title: String,
    pub description: Option<String>,
    pub breaking: bool,
    pub breaking_notes: Option<String>,
}

impl FragmentDraft {
    /// A non-breaking draft with only a title
    pub fn new(category: FragmentCategory, title: impl Into<String>) -> Self {
        Self {
            category,
            title: title.into(),
            description: None,
            breaking: false,
            breaking_notes: None,
        }
    }

    /// Attach a longer description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark as breaking, with an optional migration narrative
    pub fn breaking(mut self, notes: Option<String>) -> Self {
        self.breaking = true;
        self.breaking_notes = notes;
        self
    }

    /// Check the title
    pub fn validate(&self) -> Result<(), FragmentError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FragmentError::InvalidTitle(
                "please provide a description".to_string(),
            ));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(FragmentError::InvalidTitle(format!(
                "please keep the title under {} characters",
                MAX_TITLE_LEN
            )));
        }
        Ok(())
    }

    /// Markdown body: heading, then description and breaking narrative
    pub fn body(&self) -> String {
        let mut body = format!("# {}\n\n", self.title.trim());

        if let Some(description) = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty() && *d != DESCRIPTION_TEMPLATE)
        {
            body.push_str(&format!("{}\n\n", description));
        }

        if self.breaking {
            if let Some(notes) = self.breaking_notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                body.push_str(&format!("{}\n\n", notes));
            }
        }

        body
    }

    /// Full file content: front matter followed by the body
    pub fn render(&self, author: &FragmentAuthor, created_at: DateTime<Utc>) -> String {
        let matter = FrontMatter {
            category: Some(self.category.key().to_string()),
            author: Some(
                author
                    .name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            ),
            email: Some(author.email.clone().unwrap_or_default()),
            date: Some(created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            breaking: Some(self.breaking),
        };
        front_matter::render(&matter, &self.body())
    }
}

/// Fragment metadata as stored in front matter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breaking: Option<bool>,
}

/// A fragment read back from the holding area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Backing file name
    pub file_name: String,
    pub category: FragmentCategory,
    /// Text of the first body line, without the `# ` marker
    pub title: String,
    /// Body below the front matter
    pub body: String,
    pub author: Option<String>,
    pub email: Option<String>,
    /// Creation time as written (RFC 3339)
    pub created_at: Option<String>,
    pub breaking: bool,
}

impl Fragment {
    /// Parse fragment file content
    pub fn parse(file_name: &str, content: &str) -> Result<Self, FragmentError> {
        let parse_err = |reason: String| FragmentError::Parse {
            file: file_name.to_string(),
            reason,
        };

        let (matter, body) = front_matter::parse(content).map_err(parse_err)?;

        let category = matter
            .category
            .as_deref()
            .ok_or_else(|| parse_err("missing category".to_string()))?
            .parse::<FragmentCategory>()
            .map_err(parse_err)?;

        let title = body
            .trim()
            .lines()
            .next()
            .map(|line| line.strip_prefix("# ").unwrap_or(line).trim().to_string())
            .unwrap_or_default();

        Ok(Self {
            file_name: file_name.to_string(),
            category,
            title,
            body: body.to_string(),
            author: matter.author,
            email: matter.email,
            created_at: matter.date,
            breaking: matter.breaking.unwrap_or(false),
        })
    }
}
