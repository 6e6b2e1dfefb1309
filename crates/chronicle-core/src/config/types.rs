//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::categories::CategoryMap;
use super::defaults::{
    DEFAULT_API_ENDPOINT, DEFAULT_CHANGELOG_FILE, DEFAULT_DATABASE_FILE, DEFAULT_FRAGMENTS_DIR,
    DEFAULT_MODEL, DEFAULT_SINCE,
};

/// Environment variable that overrides `generation.api_key`
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Main configuration for Chronicle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project identity
    pub project: ProjectConfig,

    /// Generation capability settings
    pub generation: GenerationConfig,

    /// Changelog synthesis settings
    pub changelog: ChangelogConfig,

    /// Fragment workflow settings
    pub fragments: FragmentsConfig,

    /// Record store settings
    pub store: StoreConfig,
}

impl Config {
    /// Path of the flat changelog document under `root`
    pub fn changelog_path(&self, root: &Path) -> PathBuf {
        root.join(&self.changelog.file)
    }

    /// Path of the record store under `root`
    pub fn database_path(&self, root: &Path) -> PathBuf {
        root.join(&self.store.file)
    }

    /// Path of the fragment holding area under `root`
    pub fn fragments_path(&self, root: &Path) -> PathBuf {
        root.join(&self.fragments.dir)
    }

    /// API key from the environment, falling back to the config file
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.generation.api_key.clone())
    }
}

/// Project identity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name; scopes every record in the store
    pub name: String,

    /// Optional URL slug
    pub slug: Option<String>,
}

/// Generation capability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// API key (prefer the environment variable)
    pub api_key: Option<String>,

    /// API base URL
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Response token budget
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2000,
        }
    }
}

/// Changelog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Changelog file path, relative to the project root
    pub file: PathBuf,

    /// Output format (markdown, json, html)
    pub format: String,

    /// Default range start: a tag, a revspec, or `last-tag`
    pub default_since: String,

    /// Whether to list changed files in the generation prompt
    pub include_file_changes: bool,

    /// Case-insensitive substrings that exclude a commit
    pub exclude_patterns: Vec<String>,

    /// Category keys and their display labels
    pub categories: CategoryMap,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_CHANGELOG_FILE),
            format: "markdown".to_string(),
            default_since: DEFAULT_SINCE.to_string(),
            include_file_changes: true,
            exclude_patterns: vec![
                "merge".to_string(),
                "bump version".to_string(),
                "release".to_string(),
            ],
            categories: default_categories(),
        }
    }
}

/// Default commit categories
pub fn default_categories() -> CategoryMap {
    CategoryMap::new()
        .with("feat", "✨ New Features")
        .with("fix", "🐛 Bug Fixes")
        .with("docs", "📝 Documentation")
        .with("refactor", "🔧 Internal Changes")
        .with("style", "💄 Style Changes")
        .with("test", "🧪 Tests")
        .with("chore", "🔧 Maintenance")
}

/// Fragment workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentsConfig {
    /// Holding directory for unreleased fragments
    pub dir: PathBuf,
}

impl Default for FragmentsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_FRAGMENTS_DIR),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file, relative to the project root
    pub file: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_DATABASE_FILE),
        }
    }
}
