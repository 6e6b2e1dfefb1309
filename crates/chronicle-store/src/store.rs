//! SQLite changelog store

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::{debug, info, instrument};

use chronicle_changelog::document::{append_section, parse_version_sections};
use chronicle_changelog::types::{sections_from_json, Section};
use chronicle_changelog::{ChangelogEntry, LATEST_LABEL};

use crate::error::{Result, StoreError};

/// Embedded schema
const SCHEMA_SQL: &str = include_str!("schema.sql");

const DATE_FORMAT: &str = "%Y-%m-%d";

const RECORD_COLUMNS: &str =
    "id, version, date, content, categories, commit_count, project_name, created_at";

/// Newest first; ties broken by insertion
const NEWEST_FIRST: &str = "ORDER BY date DESC, created_at DESC, id DESC";

/// A stored changelog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogRecord {
    pub id: i64,
    /// Version label (`Latest Changes` when unversioned)
    pub version: String,
    pub date: NaiveDate,
    /// Markdown of the entry
    pub content: String,
    /// Category sections, in document order
    #[serde(rename = "categories")]
    pub sections: Vec<Section>,
    pub commit_count: usize,
    pub project: String,
    pub created_at: DateTime<Utc>,
}

impl ChangelogRecord {
    /// Rebuild the entry this record was made from
    pub fn to_entry(&self) -> ChangelogEntry {
        let version = (self.version != LATEST_LABEL).then(|| self.version.clone());
        let mut entry = ChangelogEntry::new(version, self.date);
        entry.sections = self.sections.clone();
        entry.raw = self.content.clone();
        entry
    }
}

/// Aggregate numbers over stored entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_versions: usize,
    pub total_commits: usize,
    /// Oldest version by date
    pub first_version: Option<String>,
    /// Newest version by date
    pub latest_version: Option<String>,
}

/// Outcome of an existence-checked insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    /// A new row was written
    Inserted(i64),
    /// The project already had this version; nothing was written
    AlreadyIndexed(i64),
}

impl IndexOutcome {
    /// Row id of the stored record
    pub fn id(&self) -> i64 {
        match self {
            Self::Inserted(id) | Self::AlreadyIndexed(id) => *id,
        }
    }
}

/// Changelog store backed by SQLite
pub struct ChangelogStore {
    conn: Connection,
}

impl ChangelogStore {
    /// Open (creating if needed) the database at `path`
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::apply_schema(&conn)?;

        debug!(path = %path.display(), "changelog store initialized");
        Ok(Self { conn })
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    fn apply_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Insert an entry unconditionally and return its id
    #[instrument(skip(self, entry), fields(version = %entry.label()))]
    pub fn save(&self, entry: &ChangelogEntry, project: &str, commit_count: usize) -> Result<i64> {
        let categories = entry.sections_json()?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        self.conn.execute(
            r#"
            INSERT INTO changelogs
                (version, date, content, categories, commit_count, project_name, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.label(),
                entry.date.format(DATE_FORMAT).to_string(),
                entry.raw,
                categories,
                commit_count as i64,
                project,
                created_at,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(id, project, "saved changelog entry");
        Ok(id)
    }

    /// Id of the record for `version` in `project`, if any
    fn find_id(&self, version: &str, project: &str) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM changelogs WHERE version = ?1 AND project_name = ?2 ORDER BY id LIMIT 1",
                params![version, project],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Insert an entry unless the project already has its version
    #[instrument(skip(self, entry), fields(version = %entry.label()))]
    pub fn index_entry(
        &self,
        entry: &ChangelogEntry,
        project: &str,
        commit_count: usize,
    ) -> Result<IndexOutcome> {
        if let Some(id) = self.find_id(entry.label(), project)? {
            debug!(id, "version already indexed");
            return Ok(IndexOutcome::AlreadyIndexed(id));
        }
        Ok(IndexOutcome::Inserted(self.save(entry, project, commit_count)?))
    }

    /// Write the entry into the changelog document, then index it.
    ///
    /// The document is updated first; the index insert is skipped when the
    /// version is already stored for the project.
    #[instrument(skip(self, entry), fields(document = %document.display(), version = %entry.label()))]
    pub fn append_and_index(
        &self,
        document: &Path,
        entry: &ChangelogEntry,
        project: &str,
        commit_count: usize,
    ) -> Result<IndexOutcome> {
        append_section(document, &entry.raw)?;
        self.index_entry(entry, project, commit_count)
    }

    fn query(&self, filter: &str, params: impl rusqlite::Params) -> Result<Vec<ChangelogRecord>> {
        let sql = format!(
            "SELECT {} FROM changelogs WHERE {} {}",
            RECORD_COLUMNS, filter, NEWEST_FIRST
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params, record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Every entry, newest first
    pub fn all(&self, project: Option<&str>) -> Result<Vec<ChangelogRecord>> {
        self.query("(?1 IS NULL OR project_name = ?1)", params![project])
    }

    /// Entries with this exact version label, newest first
    pub fn by_version(&self, version: &str, project: Option<&str>) -> Result<Vec<ChangelogRecord>> {
        self.query(
            "version = ?1 AND (?2 IS NULL OR project_name = ?2)",
            params![version, project],
        )
    }

    /// Entries whose content contains `term`, ignoring case
    #[instrument(skip(self))]
    pub fn search(&self, term: &str, project: Option<&str>) -> Result<Vec<ChangelogRecord>> {
        // SQLite LIKE only folds ASCII, so matching happens here
        let needle = term.to_lowercase();
        let records: Vec<_> = self
            .all(project)?
            .into_iter()
            .filter(|record| record.content.to_lowercase().contains(&needle))
            .collect();
        debug!(matches = records.len(), "searched changelog entries");
        Ok(records)
    }

    /// Totals and the first and latest versions
    pub fn stats(&self, project: Option<&str>) -> Result<StoreStats> {
        let (total_versions, total_commits): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(commit_count), 0) FROM changelogs WHERE (?1 IS NULL OR project_name = ?1)",
            params![project],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let version_at = |order: &str| -> Result<Option<String>> {
            let sql = format!(
                "SELECT version FROM changelogs WHERE (?1 IS NULL OR project_name = ?1) ORDER BY date {order}, created_at {order}, id {order} LIMIT 1"
            );
            Ok(self
                .conn
                .query_row(&sql, params![project], |row| row.get(0))
                .optional()?)
        };

        Ok(StoreStats {
            total_versions: total_versions as usize,
            total_commits: total_commits as usize,
            first_version: version_at("ASC")?,
            latest_version: version_at("DESC")?,
        })
    }

    /// Index every version section of `document` not yet stored for the
    /// project. Returns how many were added.
    ///
    /// Commit counts are estimated from the number of bullet lines.
    #[instrument(skip(self, document))]
    pub fn import_document(&self, document: &str, project: &str) -> Result<usize> {
        let sections = parse_version_sections(document);
        info!(sections = sections.len(), "importing changelog document");

        let tx = self.conn.unchecked_transaction()?;
        let mut imported = 0;

        for section in &sections {
            if self.find_id(&section.version, project)?.is_some() {
                debug!(version = %section.version, "already indexed, skipping");
                continue;
            }

            self.save(&section.to_entry(), project, section.bullet_count)?;
            imported += 1;
        }

        tx.commit()?;
        info!(imported, "imported changelog entries");
        Ok(imported)
    }

    /// Remove a record; returns whether it existed
    pub fn delete(&self, id: i64) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM changelogs WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Number of stored entries
    pub fn count(&self, project: Option<&str>) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM changelogs WHERE (?1 IS NULL OR project_name = ?1)",
            params![project],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Escape LIKE wildcards so the term matches literally
fn conversion_error<E>(column: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ChangelogRecord> {
    let date: String = row.get(2)?;
    let categories: String = row.get(4)?;
    let created_at: String = row.get(7)?;

    Ok(ChangelogRecord {
        id: row.get(0)?,
        version: row.get(1)?,
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|e| conversion_error(2, e))?,
        content: row.get(3)?,
        sections: sections_from_json(&categories).map_err(|e| conversion_error(4, e))?,
        commit_count: row.get::<_, i64>(5)? as usize,
        project: row.get(6)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_error(7, e))?,
    })
}
