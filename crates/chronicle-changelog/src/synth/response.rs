//! Parsing drafted changelog text into sections

use chrono::NaiveDate;

use crate::types::{ChangelogEntry, Section};

/// Parse drafted markdown into an entry.
///
/// Lines are trimmed. `###` headings open a section, `-` lines add an item
/// to the open section, and everything else (including the `##` heading) is
/// ignored. A heading seen twice starts that section over. The raw text is
/// kept as given.
pub fn parse_response(text: &str, version: Option<&str>, date: NaiveDate) -> ChangelogEntry {
    let mut entry = ChangelogEntry::new(version.map(String::from), date);
    entry.sections = parse_sections(text);
    entry.raw = text.to_string();
    entry
}

/// Section structure of a block of changelog markdown
pub fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<usize> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(title) = trimmed.strip_prefix("###") {
            let title = title.trim();
            let index = match sections.iter().position(|s| s.title == title) {
                Some(index) => {
                    sections[index].items.clear();
                    index
                }
                None => {
                    sections.push(Section::new(title));
                    sections.len() - 1
                }
            };
            current = Some(index);
            continue;
        }

        if trimmed.starts_with("##") {
            continue;
        }

        if let (Some(item), Some(index)) = (trimmed.strip_prefix('-'), current) {
            sections[index].add_item(item.trim());
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_parse_two_sections() {
        let text = "## v1.0.0 - 2024-01-15\n\n### ✨ New Features\n- Add search\n  - Add export  \n\n### 🐛 Bug Fixes\n- Fix crash\n";
        let entry = parse_response(text, Some("v1.0.0"), date());

        assert_eq!(entry.sections.len(), 2);
        assert_eq!(entry.sections[0].title, "✨ New Features");
        assert_eq!(entry.sections[0].items, vec!["Add search", "Add export"]);
        assert_eq!(entry.sections[1].title, "🐛 Bug Fixes");
        assert_eq!(entry.sections[1].items, vec!["Fix crash"]);
        assert_eq!(entry.raw, text);
        assert_eq!(entry.version.as_deref(), Some("v1.0.0"));
    }

    #[test]
    fn test_parse_without_headings() {
        let text = "Here is your changelog:\n- something happened\n";
        let entry = parse_response(text, None, date());

        assert!(entry.sections.is_empty());
        assert_eq!(entry.raw, text);
        assert_eq!(entry.label(), "Latest Changes");
    }

    #[test]
    fn test_items_before_first_heading_are_dropped() {
        let sections = parse_sections("- orphan\n### Fixes\n- kept\nnot a bullet\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].items, vec!["kept"]);
    }

    #[test]
    fn test_repeated_heading_restarts_section() {
        let sections = parse_sections("### A\n- one\n### B\n- two\n### A\n- three\n");
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(sections[0].items, vec!["three"]);
    }
}
