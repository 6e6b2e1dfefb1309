//! Git repository operations

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::{debug, info, instrument};

use chronicle_core::error::GitError;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// Git repository wrapper
pub struct GitRepo {
    pub(crate) repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at the given path
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "opening git repository");
        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::RepositoryNotFound(path.to_path_buf())
            } else {
                GitError::OpenFailed(e.to_string())
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            repo,
        })
    }

    /// Discover and open a repository by searching parent directories
    #[instrument(fields(start_path = %start_path.display()))]
    pub fn discover(start_path: &Path) -> Result<Self> {
        info!(start_path = %start_path.display(), "discovering git repository");
        let repo = Repository::discover(start_path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::NotARepository(start_path.to_path_buf())
            } else {
                GitError::OpenFailed(e.to_string())
            }
        })?;

        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    /// Whether `path` lies inside a git working tree
    pub fn is_repository(path: &Path) -> bool {
        let found = Repository::discover(path).is_ok();
        debug!(path = %path.display(), found, "checked for git repository");
        found
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured `user.name` and `user.email`, if any
    pub fn user_identity(&self) -> (Option<String>, Option<String>) {
        match self.repo.config() {
            Ok(config) => identity_from(&config),
            Err(e) => {
                debug!(error = %e, "could not read repository config");
                (None, None)
            }
        }
    }

    /// Get the HEAD commit
    pub fn head_commit(&self) -> Result<git2::Commit<'_>> {
        let head = self.repo.head().map_err(|e| {
            if e.code() == git2::ErrorCode::UnbornBranch {
                GitError::NoCommits
            } else {
                GitError::Git2(e)
            }
        })?;
        head.peel_to_commit().map_err(GitError::Git2)
    }
}

/// Identity from the user's global git configuration, outside any repository
pub fn default_identity() -> (Option<String>, Option<String>) {
    match git2::Config::open_default() {
        Ok(config) => identity_from(&config),
        Err(e) => {
            debug!(error = %e, "could not read global git config");
            (None, None)
        }
    }
}

fn identity_from(config: &git2::Config) -> (Option<String>, Option<String>) {
    let get = |key: &str| config.get_string(key).ok().filter(|v| !v.trim().is_empty());
    (get("user.name"), get("user.email"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_repo() {
        let temp = TempDir::new().unwrap();
        Repository::init(temp.path()).unwrap();
        assert!(GitRepo::open(temp.path()).is_ok());
    }

    #[test]
    fn test_discover_repo() {
        let temp = TempDir::new().unwrap();
        Repository::init(temp.path()).unwrap();

        let subdir = temp.path().join("sub").join("dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let repo = GitRepo::discover(&subdir).unwrap();
        // Canonicalize both paths to handle macOS /var -> /private/var symlink
        let repo_path = repo.path().canonicalize().unwrap();
        let temp_path = temp.path().canonicalize().unwrap();
        assert_eq!(repo_path, temp_path);
    }

    #[test]
    fn test_not_a_repo() {
        let temp = TempDir::new().unwrap();
        assert!(!GitRepo::is_repository(temp.path()));
        assert!(matches!(
            GitRepo::discover(temp.path()),
            Err(GitError::NotARepository(_))
        ));
    }

    #[test]
    fn test_user_identity_from_repo_config() {
        let temp = TempDir::new().unwrap();
        let raw = Repository::init(temp.path()).unwrap();
        let mut config = raw.config().unwrap();
        config.set_str("user.name", "Ada Lovelace").unwrap();
        config.set_str("user.email", "ada@example.com").unwrap();

        let repo = GitRepo::open(temp.path()).unwrap();
        let (name, email) = repo.user_identity();
        assert_eq!(name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_empty_repo_has_no_head_commit() {
        let temp = TempDir::new().unwrap();
        Repository::init(temp.path()).unwrap();
        let repo = GitRepo::open(temp.path()).unwrap();
        assert!(GitRepo::is_repository(temp.path()));
        assert!(matches!(repo.head_commit(), Err(GitError::NoCommits)));
    }
}
