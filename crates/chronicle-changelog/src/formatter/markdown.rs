//! Markdown changelog formatter

use tracing::{debug, instrument};

use super::ChangelogFormatter;
use crate::types::ChangelogEntry;

/// Markdown changelog formatter.
///
/// Produces the section layout of the flat document:
///
/// ```text
/// ## <version or Latest Changes> - <YYYY-MM-DD>
///
/// ### <category>
///
/// - <item>
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Create a new markdown formatter
    pub fn new() -> Self {
        Self
    }
}

impl ChangelogFormatter for MarkdownFormatter {
    #[instrument(skip(self, entry), fields(version = %entry.label(), section_count = entry.sections.len()))]
    fn format(&self, entry: &ChangelogEntry) -> String {
        let mut output = format!(
            "## {} - {}\n\n",
            entry.label(),
            entry.date.format("%Y-%m-%d")
        );

        for section in &entry.sections {
            if section.is_empty() {
                continue;
            }

            output.push_str(&format!("### {}\n\n", section.title));
            for item in &section.items {
                output.push_str(&format!("- {}\n", item));
            }
            output.push('\n');
        }

        let output = format!("{}\n", output.trim_end());
        debug!(output_len = output.len(), "markdown changelog formatted");
        output
    }

    fn name(&self) -> &'static str {
        "markdown"
    }

    fn extension(&self) -> &'static str {
        "md"
    }
}
