//! Changelog types

use std::fmt;

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Heading used when an entry has no version
pub const LATEST_LABEL: &str = "Latest Changes";

/// A category section in a changelog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section title, as it appears after `###`
    pub title: String,
    /// Bullet items, in document order
    pub items: Vec<String>,
}

impl Section {
    /// Create a new section
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    /// Add an item to the section
    pub fn add_item(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Check if section is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A changelog entry for a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// Version string; `None` means unreleased
    pub version: Option<String>,
    /// Release date
    pub date: NaiveDate,
    /// Category sections in this entry
    #[serde(
        serialize_with = "serialize_sections",
        deserialize_with = "deserialize_sections"
    )]
    pub sections: Vec<Section>,
    /// Rendered markdown, authoritative for the document
    pub raw: String,
}

impl ChangelogEntry {
    /// Create an empty entry
    pub fn new(version: Option<String>, date: NaiveDate) -> Self {
        Self {
            version,
            date,
            sections: Vec::new(),
            raw: String::new(),
        }
    }

    /// Version, or the "latest changes" label when unreleased
    pub fn label(&self) -> &str {
        self.version.as_deref().unwrap_or(LATEST_LABEL)
    }

    /// Total bullet items across all sections
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// Look up a section by title
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Sections as an ordered JSON object (`{"title": ["item", ...]}`)
    pub fn sections_json(&self) -> serde_json::Result<String> {
        sections_to_json(&self.sections)
    }
}

/// Encode sections as an ordered JSON object
pub fn sections_to_json(sections: &[Section]) -> serde_json::Result<String> {
    serde_json::to_string(&SectionMap(sections.to_vec()))
}

/// Decode sections from an ordered JSON object
pub fn sections_from_json(json: &str) -> serde_json::Result<Vec<Section>> {
    serde_json::from_str::<SectionMap>(json).map(|m| m.0)
}

/// Sections serialized as a title → items map, keeping order
struct SectionMap(Vec<Section>);

impl Serialize for SectionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for section in &self.0 {
            map.serialize_entry(&section.title, &section.items)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SectionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionMapVisitor;

        impl<'de> Visitor<'de> for SectionMapVisitor {
            type Value = SectionMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of section titles to item lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut sections = Vec::new();
                while let Some((title, items)) = access.next_entry::<String, Vec<String>>()? {
                    sections.push(Section { title, items });
                }
                Ok(SectionMap(sections))
            }
        }

        deserializer.deserialize_map(SectionMapVisitor)
    }
}

fn serialize_sections<S: Serializer>(sections: &[Section], serializer: S) -> Result<S::Ok, S::Error> {
    SectionMap(sections.to_vec()).serialize(serializer)
}

fn deserialize_sections<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Section>, D::Error> {
    SectionMap::deserialize(deserializer).map(|m| m.0)
}

/// Which synthesis path produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisPath {
    /// Drafted by the generation capability
    Ai,
    /// Rendered deterministically after an authentication failure
    Fallback,
}

impl fmt::Display for SynthesisPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ai => f.write_str("ai"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> ChangelogEntry {
        let mut entry = ChangelogEntry::new(None, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let mut fixes = Section::new("🐛 Bug Fixes");
        fixes.add_item("Handle empty input");
        let mut feats = Section::new("✨ New Features");
        feats.add_item("Add search");
        feats.add_item("Add export");
        entry.sections = vec![fixes, feats];
        entry
    }

    #[test]
    fn test_label_defaults_to_latest() {
        let mut entry = sample_entry();
        assert_eq!(entry.label(), "Latest Changes");
        entry.version = Some("v1.2.0".to_string());
        assert_eq!(entry.label(), "v1.2.0");
    }

    #[test]
    fn test_sections_json_keeps_order() {
        let entry = sample_entry();
        let json = entry.sections_json().unwrap();
        assert_eq!(
            json,
            r#"{"🐛 Bug Fixes":["Handle empty input"],"✨ New Features":["Add search","Add export"]}"#
        );

        let decoded = sections_from_json(&json).unwrap();
        assert_eq!(decoded, entry.sections);
        assert_eq!(entry.item_count(), 3);
    }

    #[test]
    fn test_section_lookup() {
        let entry = sample_entry();
        assert!(entry.section("✨ New Features").is_some());
        assert!(entry.section("Chores").is_none());
    }
}
