//! JSON changelog formatter

use serde_json::json;

use super::ChangelogFormatter;
use crate::types::ChangelogEntry;

/// Renders an entry as a JSON object with ordered sections
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter;

impl ChangelogFormatter for JsonFormatter {
    fn format(&self, entry: &ChangelogEntry) -> String {
        let sections: Vec<_> = entry
            .sections
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| json!({ "title": s.title, "items": s.items }))
            .collect();

        let value = json!({
            "version": entry.label(),
            "date": entry.date.format("%Y-%m-%d").to_string(),
            "sections": sections,
        });

        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Section;
    use chrono::NaiveDate;

    #[test]
    fn test_format_json() {
        let mut entry = ChangelogEntry::new(
            Some("v2.0.0".to_string()),
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        );
        let mut section = Section::new("🐛 Bug Fixes");
        section.add_item("Handle timeouts");
        entry.sections.push(section);

        let output = JsonFormatter.format(&entry);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["version"], "v2.0.0");
        assert_eq!(value["date"], "2024-05-02");
        assert_eq!(value["sections"][0]["title"], "🐛 Bug Fixes");
        assert_eq!(value["sections"][0]["items"][0], "Handle timeouts");
    }
}
