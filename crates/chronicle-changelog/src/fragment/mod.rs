//! Changelog fragments
//!
//! Contributors describe each change in its own small markdown file in a
//! holding directory. At release time the fragments are consolidated into
//! one version section of the changelog document and removed.

mod front_matter;
mod types;

pub use types::{
    fragment_file_name, slugify, Fragment, FragmentAuthor, FragmentCategory, FragmentDraft,
    FrontMatter, BREAKING_TEMPLATE, DESCRIPTION_TEMPLATE, MAX_SLUG_LEN, MAX_TITLE_LEN,
    UNKNOWN_AUTHOR,
};

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info, instrument, warn};

use chronicle_core::error::{ChangelogError, FragmentError};

use crate::document::{insert_section, read_document, write_document, StagedDocument};
use crate::formatter::{ChangelogFormatter, MarkdownFormatter};
use crate::types::{ChangelogEntry, Section};

/// Result type for fragment operations
pub type Result<T> = std::result::Result<T, FragmentError>;

/// Directory inside the holding area where fragments wait during a release
const STAGING_DIR: &str = ".release-staging";

/// Validation outcome for one fragment file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// File name within the holding area
    pub file: String,
    /// Problems found; empty when the file is valid
    pub problems: Vec<String>,
}

impl FileReport {
    /// Whether the file passed every check
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Validation outcome for the whole holding area
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub files: Vec<FileReport>,
}

impl ValidationReport {
    /// True when every file is valid (and when there are none)
    pub fn is_valid(&self) -> bool {
        self.files.iter().all(FileReport::is_valid)
    }

    /// Number of files with problems
    pub fn invalid_count(&self) -> usize {
        self.files.iter().filter(|f| !f.is_valid()).count()
    }
}

/// Result of consolidating fragments into the document
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Rendered version section
    pub section: String,
    /// Fragments included in the section
    pub included: usize,
    /// Files that could not be parsed and were left out
    pub skipped: Vec<String>,
}

/// The holding area for unreleased fragments
#[derive(Debug, Clone)]
pub struct FragmentStore {
    dir: PathBuf,
    date: Option<NaiveDate>,
}

impl FragmentStore {
    /// Create a store over a holding directory (created on demand)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            date: None,
        }
    }

    /// Pin the build date instead of using today
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Holding directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }

    fn staging_dir(&self) -> PathBuf {
        self.dir.join(STAGING_DIR)
    }

    /// Fragment files in name order. A missing holding area is empty.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                files.push(path);
            }
        }
        files.sort();

        debug!(dir = %self.dir.display(), count = files.len(), "listed fragments");
        Ok(files)
    }

    /// Write a new fragment and return its path
    pub fn create(&self, draft: &FragmentDraft, author: &FragmentAuthor) -> Result<PathBuf> {
        self.create_at(draft, author, Utc::now())
    }

    /// Write a new fragment stamped with `now`
    #[instrument(skip(self, draft, author), fields(category = %draft.category))]
    pub fn create_at(
        &self,
        draft: &FragmentDraft,
        author: &FragmentAuthor,
        now: DateTime<Utc>,
    ) -> Result<PathBuf> {
        draft.validate()?;

        let file_name = fragment_file_name(now.date_naive(), draft.title.trim());
        let path = self.dir.join(&file_name);
        info!(file = %file_name, "creating fragment");

        fs::create_dir_all(&self.dir)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(FragmentError::DuplicateFragment(file_name));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(draft.render(author, now).as_bytes())?;

        Ok(path)
    }

    /// Check every fragment file
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn validate(&self) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();

        for path in self.list()? {
            let file = file_name_of(&path);
            let problems = match read_text(&path)? {
                Ok(content) => validate_content(&content),
                Err(reason) => vec![reason],
            };
            if !problems.is_empty() {
                debug!(file = %file, ?problems, "fragment failed validation");
            }
            report.files.push(FileReport { file, problems });
        }

        info!(
            files = report.files.len(),
            invalid = report.invalid_count(),
            "validated fragments"
        );
        Ok(report)
    }

    /// Parse the given files, skipping the ones that do not parse
    fn load(&self, files: &[PathBuf]) -> Result<(Vec<Fragment>, Vec<String>)> {
        let mut fragments = Vec::new();
        let mut skipped = Vec::new();

        for path in files {
            let file = file_name_of(path);
            let content = match read_text(path)? {
                Ok(content) => content,
                Err(reason) => {
                    warn!(file = %file, error = %reason, "could not read fragment, skipping");
                    skipped.push(file);
                    continue;
                }
            };
            match Fragment::parse(&file, &content) {
                Ok(fragment) => fragments.push(fragment),
                Err(e) => {
                    warn!(file = %file, error = %e, "could not parse fragment, skipping");
                    skipped.push(file);
                }
            }
        }

        Ok((fragments, skipped))
    }

    /// Render the version section for `fragments`
    pub fn render_section(&self, version: &str, fragments: &[Fragment]) -> String {
        let mut entry = ChangelogEntry::new(Some(version.to_string()), self.today());

        for category in FragmentCategory::ALL {
            let mut section = Section::new(category.label());
            for fragment in fragments.iter().filter(|f| f.category == category) {
                section.add_item(fragment.title.as_str());
            }
            if !section.is_empty() {
                entry.sections.push(section);
            }
        }

        MarkdownFormatter::new().format(&entry)
    }

    /// Section and new document content for the current fragments
    fn prepare(&self, version: &str, document: &Path) -> Result<(Vec<PathBuf>, BuildReport, String)> {
        let files = self.list()?;
        if files.is_empty() {
            return Err(FragmentError::NothingToBuild(self.dir.clone()));
        }

        let (fragments, skipped) = self.load(&files)?;
        let section = self.render_section(version, &fragments);
        let content = insert_section(&read_document(document)?, &section);

        let report = BuildReport {
            section,
            included: fragments.len(),
            skipped,
        };
        Ok((files, report, content))
    }

    /// Write a version section built from the fragments into `document`.
    ///
    /// Fragments are left in place.
    #[instrument(skip(self), fields(document = %document.display()))]
    pub fn build(&self, version: &str, document: &Path) -> Result<BuildReport> {
        info!(version, "building changelog from fragments");
        let (_, report, content) = self.prepare(version, document)?;
        write_document(document, &content)?;
        info!(included = report.included, "updated changelog");
        Ok(report)
    }

    /// Delete every fragment and return how many were removed
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn clean(&self) -> Result<usize> {
        let files = self.list()?;
        for path in &files {
            fs::remove_file(path)?;
            debug!(file = %path.display(), "removed fragment");
        }
        info!(count = files.len(), "cleaned fragments");
        Ok(files.len())
    }

    /// Build and clean as one unit.
    ///
    /// The new document is staged beside the target and the fragments are
    /// moved aside before the staged document replaces the target. If any
    /// step fails the fragments are moved back and the document keeps its
    /// previous content.
    #[instrument(skip(self), fields(document = %document.display()))]
    pub fn release(&self, version: &str, document: &Path) -> Result<BuildReport> {
        info!(version, "releasing fragments");
        self.recover_staged()?;

        let (files, report, content) = self.prepare(version, document)?;
        let staged = StagedDocument::new(document, &content)?;
        self.consume(&files, || staged.commit())?;

        info!(included = report.included, "released fragments");
        Ok(report)
    }

    /// Move `files` aside, run `commit`, then drop them for good.
    ///
    /// On failure every moved file is put back.
    fn consume<F>(&self, files: &[PathBuf], commit: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<(), ChangelogError>,
    {
        let staging = self.staging_dir();
        fs::create_dir_all(&staging)?;

        let mut moved: Vec<(PathBuf, PathBuf)> = Vec::new();
        for path in files {
            let target = staging.join(file_name_of(path));
            if let Err(e) = fs::rename(path, &target) {
                self.restore(&moved);
                return Err(FragmentError::ReleaseFailed(format!(
                    "could not stage {}: {}",
                    path.display(),
                    e
                )));
            }
            moved.push((path.clone(), target));
        }

        if let Err(e) = commit() {
            self.restore(&moved);
            return Err(FragmentError::ReleaseFailed(e.to_string()));
        }

        if let Err(e) = fs::remove_dir_all(&staging) {
            warn!(dir = %staging.display(), error = %e, "could not remove release staging directory");
        }
        Ok(())
    }

    fn restore(&self, moved: &[(PathBuf, PathBuf)]) {
        for (original, staged) in moved {
            if let Err(e) = fs::rename(staged, original) {
                error!(
                    file = %original.display(),
                    staged = %staged.display(),
                    error = %e,
                    "could not restore fragment"
                );
            }
        }
        let _ = fs::remove_dir(self.staging_dir());
    }

    /// Put back fragments left in the staging directory by an interrupted release
    fn recover_staged(&self) -> Result<()> {
        let staging = self.staging_dir();
        let entries = match fs::read_dir(&staging) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let staged = entry?.path();
            let original = self.dir.join(file_name_of(&staged));
            if original.exists() {
                warn!(file = %original.display(), "fragment exists in both holding and staging areas, keeping holding copy");
                continue;
            }
            warn!(file = %original.display(), "recovering fragment from interrupted release");
            fs::rename(&staged, &original)?;
        }

        fs::remove_dir_all(&staging)?;
        Ok(())
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Problems with one fragment file's content
/// Read a fragment file. Content that is not UTF-8 comes back as the inner
/// error so callers can report it per file.
fn read_text(path: &Path) -> Result<std::result::Result<String, String>> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8(bytes).map_err(|e| format!("File is not valid UTF-8: {}", e.utf8_error())))
}

fn validate_content(content: &str) -> Vec<String> {
    let mut problems = Vec::new();

    let (matter, body) = match front_matter::parse(content) {
        Ok(parsed) => parsed,
        Err(reason) => return vec![reason],
    };

    match matter.category.as_deref() {
        None => problems.push("Missing category in frontmatter".to_string()),
        Some(category) if category.parse::<FragmentCategory>().is_err() => {
            problems.push(format!("Invalid category: {}", category));
        }
        Some(_) => {}
    }

    let body = body.trim();
    if !body.lines().next().is_some_and(|line| line.starts_with("# ")) {
        problems.push("Missing title (should start with # )".to_string());
    }
    if body.chars().count() <= 10 {
        problems.push("Content too short".to_string());
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{parse_version_sections, DEFAULT_HEADER};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> FragmentStore {
        FragmentStore::new(temp.path().join("changelog").join("unreleased"))
            .with_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    fn author() -> FragmentAuthor {
        FragmentAuthor::new(Some("Ada".to_string()), Some("ada@example.com".to_string()))
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
    }

    fn add(store: &FragmentStore, category: FragmentCategory, title: &str, day: u32) -> PathBuf {
        store
            .create_at(&FragmentDraft::new(category, title), &author(), at(day))
            .unwrap()
    }

    #[test]
    fn test_create_fragment() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let path = add(&store, FragmentCategory::Fixed, "Fix login bug!", 15);
        assert_eq!(file_name_of(&path), "2024-01-15-fix-login-bug.md");

        let content = fs::read_to_string(&path).unwrap();
        let fragment = Fragment::parse("x.md", &content).unwrap();
        assert_eq!(fragment.category, FragmentCategory::Fixed);
        assert_eq!(fragment.title, "Fix login bug!");
        assert_eq!(fragment.author.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_create_duplicate_fails() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        add(&store, FragmentCategory::Fixed, "Fix login bug", 15);

        let err = store
            .create_at(
                &FragmentDraft::new(FragmentCategory::Added, "Fix login bug"),
                &author(),
                at(15),
            )
            .unwrap_err();
        assert!(matches!(err, FragmentError::DuplicateFragment(name) if name == "2024-01-15-fix-login-bug.md"));
    }

    #[test]
    fn test_create_rejects_empty_title() {
        let temp = TempDir::new().unwrap();
        let err = store(&temp)
            .create(&FragmentDraft::new(FragmentCategory::Added, "  "), &author())
            .unwrap_err();
        assert!(matches!(err, FragmentError::InvalidTitle(_)));
    }

    #[test]
    fn test_validate_reports_each_file() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        add(&store, FragmentCategory::Added, "Add search endpoint", 1);

        fs::write(store.dir().join("b-bad-category.md"), "---\ncategory: feature\n---\n# Something new here\n").unwrap();
        fs::write(store.dir().join("c-no-heading.md"), "---\ncategory: fixed\n---\nJust a sentence without heading\n").unwrap();
        fs::write(store.dir().join("d-short.md"), "---\ncategory: fixed\n---\n# Tiny\n").unwrap();
        fs::write(store.dir().join("e-broken.md"), "---\ncategory: [oops\n---\n# Broken yaml\n").unwrap();
        fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        let report = store.validate().unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.files.len(), 5);
        assert_eq!(report.invalid_count(), 4);

        assert!(report.files[0].is_valid());
        assert_eq!(report.files[1].problems, vec!["Invalid category: feature"]);
        assert_eq!(report.files[2].problems, vec!["Missing title (should start with # )"]);
        assert_eq!(report.files[3].problems, vec!["Content too short"]);
        assert!(report.files[4].problems[0].starts_with("invalid front matter"));
    }

    #[test]
    fn test_validate_empty_holding_area() {
        let temp = TempDir::new().unwrap();
        let report = store(&temp).validate().unwrap();
        assert!(report.is_valid());
        assert!(report.files.is_empty());
    }

    #[test]
    fn test_build_orders_categories() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let document = temp.path().join("CHANGELOG.md");

        add(&store, FragmentCategory::Fixed, "Fix crash on empty input", 1);
        add(&store, FragmentCategory::Added, "Add search endpoint", 2);
        add(&store, FragmentCategory::Fixed, "Fix memory leak", 3);

        let report = store.build("v1.2.0", &document).unwrap();
        assert_eq!(report.included, 3);
        assert_eq!(
            report.section,
            "## v1.2.0 - 2024-03-01\n\n### ✨ Added\n\n- Add search endpoint\n\n### 🐛 Fixed\n\n- Fix crash on empty input\n- Fix memory leak\n"
        );

        let content = fs::read_to_string(&document).unwrap();
        assert!(content.starts_with(DEFAULT_HEADER));
        assert_eq!(parse_version_sections(&content)[0].version, "v1.2.0");
        // build leaves fragments in place
        assert_eq!(store.list().unwrap().len(), 3);
    }

    #[test]
    fn test_build_inserts_above_previous_release() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let document = temp.path().join("CHANGELOG.md");
        fs::write(&document, "# Changelog\n\n## v1.0.0 - 2024-01-01\n\n- Initial\n").unwrap();

        add(&store, FragmentCategory::Changed, "Rename config keys", 5);
        store.build("v1.1.0", &document).unwrap();

        let versions: Vec<_> = parse_version_sections(&fs::read_to_string(&document).unwrap())
            .into_iter()
            .map(|s| s.version)
            .collect();
        assert_eq!(versions, vec!["v1.1.0", "v1.0.0"]);
    }

    #[test]
    fn test_build_without_fragments() {
        let temp = TempDir::new().unwrap();
        let document = temp.path().join("CHANGELOG.md");

        let err = store(&temp).build("v1.0.0", &document).unwrap_err();
        assert!(matches!(err, FragmentError::NothingToBuild(_)));
        assert!(!document.exists());
    }

    #[test]
    fn test_build_skips_unparseable() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        add(&store, FragmentCategory::Security, "Rotate signing keys", 1);
        fs::write(store.dir().join("zz-broken.md"), "---\ncategory: nope\n---\n# Broken\n").unwrap();

        let report = store.build("v2.0.0", &temp.path().join("CHANGELOG.md")).unwrap();
        assert_eq!(report.included, 1);
        assert_eq!(report.skipped, vec!["zz-broken.md"]);
        assert!(!report.section.contains("Broken"));
    }

    fn write_latin1(store: &FragmentStore) {
        fs::write(
            store.dir().join("zz-latin1.md"),
            b"---\ncategory: fixed\n---\n# Caf\xe9 menu fix\n",
        )
        .unwrap();
    }

    #[test]
    fn test_validate_reports_non_utf8_file() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        add(&store, FragmentCategory::Added, "Add search endpoint", 1);
        write_latin1(&store);

        let report = store.validate().unwrap();
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.invalid_count(), 1);
        assert!(report.files[0].is_valid());
        assert_eq!(report.files[1].file, "zz-latin1.md");
        assert!(report.files[1].problems[0].starts_with("File is not valid UTF-8"));
    }

    #[test]
    fn test_build_skips_non_utf8_file() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        add(&store, FragmentCategory::Added, "Add search endpoint", 1);
        write_latin1(&store);

        let report = store.build("v2.1.0", &temp.path().join("CHANGELOG.md")).unwrap();
        assert_eq!(report.included, 1);
        assert_eq!(report.skipped, vec!["zz-latin1.md"]);
    }

    #[test]
    fn test_clean() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        add(&store, FragmentCategory::Added, "One thing", 1);
        add(&store, FragmentCategory::Added, "Another thing", 2);

        assert_eq!(store.clean().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.clean().unwrap(), 0);
    }

    #[test]
    fn test_release_consumes_fragments() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let document = temp.path().join("CHANGELOG.md");
        add(&store, FragmentCategory::Removed, "Drop legacy endpoint", 1);

        let report = store.release("v3.0.0", &document).unwrap();
        assert_eq!(report.included, 1);
        assert!(store.list().unwrap().is_empty());
        assert!(!store.dir().join(STAGING_DIR).exists());
        assert!(fs::read_to_string(&document)
            .unwrap()
            .contains("### 🗑️ Removed\n\n- Drop legacy endpoint"));
    }

    #[test]
    fn test_release_failure_keeps_fragments() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        // a directory where the document should be cannot be replaced
        let document = temp.path().join("CHANGELOG.md");
        fs::create_dir_all(&document).unwrap();
        add(&store, FragmentCategory::Added, "Add search endpoint", 1);

        assert!(store.release("v1.0.0", &document).is_err());
        assert_eq!(store.list().unwrap().len(), 1);
        assert!(!store.dir().join(STAGING_DIR).exists());
    }

    #[test]
    fn test_failed_commit_restores_fragments() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let a = add(&store, FragmentCategory::Added, "First change", 1);
        let b = add(&store, FragmentCategory::Fixed, "Second change", 2);
        let files = store.list().unwrap();

        let err = store
            .consume(&files, || {
                Err(ChangelogError::Io(io::Error::new(io::ErrorKind::Other, "disk full")))
            })
            .unwrap_err();

        assert!(matches!(err, FragmentError::ReleaseFailed(msg) if msg.contains("disk full")));
        assert!(a.exists());
        assert!(b.exists());
        assert!(!store.dir().join(STAGING_DIR).exists());
    }

    #[test]
    fn test_release_recovers_interrupted_staging() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let document = temp.path().join("CHANGELOG.md");
        let path = add(&store, FragmentCategory::Fixed, "Fix stuck release", 1);

        let staging = store.dir().join(STAGING_DIR);
        fs::create_dir_all(&staging).unwrap();
        fs::rename(&path, staging.join(file_name_of(&path))).unwrap();

        let report = store.release("v1.0.1", &document).unwrap();
        assert_eq!(report.included, 1);
        assert!(!staging.exists());
    }
}
