//! Error types for Chronicle

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ChronicleError
pub type Result<T> = std::result::Result<T, ChronicleError>;

/// Main error type for Chronicle operations
#[derive(Debug, Error)]
pub enum ChronicleError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// Generation capability errors
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Fragment workflow errors
    #[error(transparent)]
    Fragment(#[from] FragmentError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found in {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// No commits found
    #[error("No commits found in repository")]
    NoCommits,

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// The VCS returned nothing for the requested range
    #[error("No commits found since {since}")]
    NoCommitsFound { since: String },

    /// Every commit was dropped by the exclude patterns
    #[error("No relevant commits found after filtering")]
    NoCommitsAfterFilter,

    /// Failed to read the changelog document
    #[error("Failed to read changelog {path}: {source}")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the changelog document
    #[error("Failed to write changelog {path}: {source}")]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the text generation capability
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The provider rejected our credentials
    #[error("Generation authentication failed: {0}")]
    Authentication(String),

    /// Any other provider or transport failure
    #[error("Failed to generate changelog: {0}")]
    Failed(String),

    /// The provider answered with something other than text
    #[error("Unexpected response shape from generator: {0}")]
    UnexpectedResponseShape(String),
}

impl GenerationError {
    /// Whether this failure should switch synthesis to the offline path.
    ///
    /// Providers do not always classify their errors, so the message of a
    /// generic failure is also checked for the usual markers.
    pub fn is_authentication(&self) -> bool {
        match self {
            Self::Authentication(_) => true,
            Self::Failed(message) => {
                message.contains("authentication_error") || message.contains("401")
            }
            Self::UnexpectedResponseShape(_) => false,
        }
    }
}

/// Fragment workflow errors
#[derive(Debug, Error)]
pub enum FragmentError {
    /// A fragment with the same backing file already exists
    #[error("Fragment {0} already exists")]
    DuplicateFragment(String),

    /// Title is empty or too long
    #[error("Invalid fragment title: {0}")]
    InvalidTitle(String),

    /// No fragments in the holding area
    #[error("No unreleased changelog entries found in {0}")]
    NothingToBuild(PathBuf),

    /// Fragment front matter could not be parsed
    #[error("Failed to parse fragment {file}: {reason}")]
    Parse { file: String, reason: String },

    /// Release could not be completed; fragments were restored
    #[error("Release failed, fragments restored: {0}")]
    ReleaseFailed(String),

    /// Changelog document error
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChronicleError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}
