//! The flat changelog document
//!
//! A running header followed by version sections, newest first:
//!
//! ```text
//! # Changelog
//!
//! ## v1.2.0 - 2024-02-01
//!
//! ### 🐛 Bug Fixes
//!
//! - Handle empty input
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use chronicle_core::error::ChangelogError;

use crate::synth::parse_sections;
use crate::types::{ChangelogEntry, LATEST_LABEL};

/// Result type for document operations
pub type Result<T> = std::result::Result<T, ChangelogError>;

/// Header written to a document that does not exist yet
pub const DEFAULT_HEADER: &str =
    "# Changelog\n\nAll notable changes to this project will be documented in this file.\n";

/// `## <version> - <YYYY-MM-DD>`
static VERSION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^## (.+?) - (\d{4}-\d{2}-\d{2})").expect("Invalid regex"));

/// One version section of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSection {
    /// Version label as written in the heading
    pub version: String,
    /// Date from the heading
    pub date: NaiveDate,
    /// Heading and body, trimmed
    pub content: String,
    /// Number of `- ` bullet lines in the body
    pub bullet_count: usize,
}

impl VersionSection {
    /// Convert to an entry, recovering category sections from the body
    pub fn to_entry(&self) -> ChangelogEntry {
        let version = (self.version != LATEST_LABEL).then(|| self.version.clone());
        let mut entry = ChangelogEntry::new(version, self.date);
        entry.sections = parse_sections(&self.content);
        entry.raw = self.content.clone();
        entry
    }
}

fn version_heading(line: &str) -> Option<(String, NaiveDate)> {
    let caps = VERSION_HEADING.captures(line)?;
    let date = NaiveDate::parse_from_str(&caps[2], "%Y-%m-%d").ok()?;
    Some((caps[1].to_string(), date))
}

/// Split a document into its version sections, in document order.
///
/// Text before the first version heading is the running header and is not
/// returned. Headings with impossible dates are treated as body text.
pub fn parse_version_sections(document: &str) -> Vec<VersionSection> {
    let mut sections = Vec::new();
    let mut current: Option<(String, NaiveDate, Vec<&str>, usize)> = None;

    for line in document.lines() {
        if let Some((version, date)) = version_heading(line) {
            if let Some(done) = current.take() {
                sections.push(finish_section(done));
            }
            current = Some((version, date, vec![line], 0));
        } else if let Some((_, _, lines, bullets)) = current.as_mut() {
            if line.starts_with("- ") {
                *bullets += 1;
            }
            lines.push(line);
        }
    }

    if let Some(done) = current {
        sections.push(finish_section(done));
    }

    debug!(count = sections.len(), "parsed version sections");
    sections
}

fn finish_section((version, date, lines, bullet_count): (String, NaiveDate, Vec<&str>, usize)) -> VersionSection {
    VersionSection {
        version,
        date,
        content: lines.join("\n").trim().to_string(),
        bullet_count,
    }
}

/// Byte offset of the first line starting with `## `
fn first_section_offset(document: &str) -> Option<usize> {
    let mut offset = 0;
    for line in document.split_inclusive('\n') {
        if line.starts_with("## ") {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Insert `section` before the first `## ` section, or after the running
/// header when there is none.
pub fn insert_section(document: &str, section: &str) -> String {
    let section = section.trim();

    match first_section_offset(document) {
        Some(offset) => {
            let (head, tail) = document.split_at(offset);
            format!("{}{}\n\n{}", head, section, tail)
        }
        None => {
            let head = document.trim_end();
            if head.is_empty() {
                format!("{}\n", section)
            } else {
                format!("{}\n\n{}\n", head, section)
            }
        }
    }
}

/// Read the document, or `None` when it does not exist
pub fn read_existing(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ChangelogError::DocumentRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Read the document, starting from [`DEFAULT_HEADER`] when it does not exist
pub fn read_document(path: &Path) -> Result<String> {
    Ok(read_existing(path)?.unwrap_or_else(|| DEFAULT_HEADER.to_string()))
}

/// Insert `section` into the document at `path` and write it back
#[instrument(skip(section), fields(path = %path.display()))]
pub fn append_section(path: &Path, section: &str) -> Result<()> {
    let document = read_document(path)?;
    write_document(path, &insert_section(&document, section))
}

/// Replace the document atomically
pub fn write_document(path: &Path, content: &str) -> Result<()> {
    StagedDocument::new(path, content)?.commit()
}

/// New document content written beside its target, not yet visible.
///
/// Dropping a staged document without committing discards it.
pub struct StagedDocument {
    path: PathBuf,
    file: NamedTempFile,
}

impl StagedDocument {
    /// Stage `content` for `path`
    pub fn new(path: &Path, content: &str) -> Result<Self> {
        let write_err = |source| ChangelogError::DocumentWrite {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(write_err)?;

        let mut file = NamedTempFile::new_in(&dir).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;

        debug!(path = %path.display(), staged = %file.path().display(), "staged document");
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Atomically move the staged content over the target
    pub fn commit(self) -> Result<()> {
        let path = self.path;
        self.file
            .persist(&path)
            .map_err(|e| ChangelogError::DocumentWrite {
                path: path.clone(),
                source: e.error,
            })?;
        debug!(path = %path.display(), "wrote document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const DOC: &str = "# Changelog\n\nIntro text.\n\n## v1.1.0 - 2024-02-01\n\n### 🐛 Bug Fixes\n\n- Fix crash\n- Fix leak\n\n## Unreleased notes\n\nfree text\n\n## v1.0.0 - 2024-01-01\n\n### ✨ New Features\n\n- Search\n";

    #[test]
    fn test_parse_version_sections() {
        let sections = parse_version_sections(DOC);
        assert_eq!(sections.len(), 2);

        assert_eq!(sections[0].version, "v1.1.0");
        assert_eq!(sections[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(sections[0].bullet_count, 2);
        assert!(sections[0].content.starts_with("## v1.1.0 - 2024-02-01"));
        // non-version headings stay with the preceding section
        assert!(sections[0].content.ends_with("free text"));

        assert_eq!(sections[1].version, "v1.0.0");
        assert_eq!(sections[1].bullet_count, 1);
    }

    #[test]
    fn test_section_to_entry() {
        let sections = parse_version_sections(DOC);
        let entry = sections[1].to_entry();
        assert_eq!(entry.version.as_deref(), Some("v1.0.0"));
        assert_eq!(entry.sections[0].title, "✨ New Features");
        assert_eq!(entry.sections[0].items, vec!["Search"]);

        let latest = parse_version_sections("## Latest Changes - 2024-03-03\n- x\n");
        assert_eq!(latest[0].to_entry().version, None);
    }

    #[test]
    fn test_invalid_date_is_not_a_heading() {
        let sections = parse_version_sections("## v1 - 2024-13-45\n- a\n");
        assert!(sections.is_empty());
    }

    #[test]
    fn test_insert_before_first_section() {
        let updated = insert_section(DOC, "## v1.2.0 - 2024-03-01\n\n### 🔒 Security\n\n- Rotate keys\n");
        assert!(updated.starts_with(
            "# Changelog\n\nIntro text.\n\n## v1.2.0 - 2024-03-01\n\n### 🔒 Security\n\n- Rotate keys\n\n## v1.1.0"
        ));
        assert_eq!(parse_version_sections(&updated).len(), 3);
    }

    #[test]
    fn test_insert_after_header_only() {
        let updated = insert_section(DEFAULT_HEADER, "## v0.1.0 - 2024-01-01\n\n- first");
        assert_eq!(
            updated,
            "# Changelog\n\nAll notable changes to this project will be documented in this file.\n\n## v0.1.0 - 2024-01-01\n\n- first\n"
        );
    }

    #[test]
    fn test_append_section_creates_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docs").join("CHANGELOG.md");

        append_section(&path, "## v0.1.0 - 2024-01-01\n\n- first").unwrap();
        append_section(&path, "## v0.2.0 - 2024-02-01\n\n- second").unwrap();

        let content = read_document(&path).unwrap();
        assert!(content.starts_with("# Changelog"));
        let versions: Vec<_> = parse_version_sections(&content)
            .into_iter()
            .map(|s| s.version)
            .collect();
        assert_eq!(versions, vec!["v0.2.0", "v0.1.0"]);
    }

    #[test]
    fn test_dropped_stage_leaves_document_untouched() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("CHANGELOG.md");
        fs::write(&path, "original").unwrap();

        let staged = StagedDocument::new(&path, "replacement").unwrap();
        drop(staged);

        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_read_existing_missing() {
        let temp = TempDir::new().unwrap();
        assert_eq!(read_existing(&temp.path().join("nope.md")).unwrap(), None);
    }
}
