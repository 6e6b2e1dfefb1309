//! Exit codes for the CLI

use std::fmt;

use chronicle_core::error::{ChronicleError, GitError};

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// Validation error
pub const VALIDATION_ERROR: i32 = 5;

/// User cancelled
pub const CANCELLED: i32 = 130;

/// A failure the command has already reported; only the exit code is left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit(pub i32);

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit code {}", self.0)
    }
}

impl std::error::Error for Exit {}

/// Pick the exit code for a command failure
pub fn for_error(error: &anyhow::Error) -> i32 {
    if let Some(Exit(code)) = error.downcast_ref::<Exit>() {
        return *code;
    }
    if let Some(e) = error.downcast_ref::<ChronicleError>() {
        return match e {
            ChronicleError::Config(_) => CONFIG_ERROR,
            ChronicleError::Git(_) => GIT_ERROR,
            _ => ERROR,
        };
    }
    if error.downcast_ref::<GitError>().is_some() {
        return GIT_ERROR;
    }
    if let Some(dialoguer::Error::IO(e)) = error.downcast_ref::<dialoguer::Error>() {
        if e.kind() == std::io::ErrorKind::Interrupted {
            return CANCELLED;
        }
    }
    ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::error::ConfigError;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_passthrough() {
        let err = anyhow::Error::new(Exit(VALIDATION_ERROR));
        assert_eq!(for_error(&err), VALIDATION_ERROR);
    }

    #[test]
    fn test_exit_code_by_error_kind() {
        let config = anyhow::Error::new(ChronicleError::Config(ConfigError::NotFound(
            PathBuf::from("/tmp"),
        )));
        assert_eq!(for_error(&config), CONFIG_ERROR);

        let git = anyhow::Error::new(GitError::NotARepository(PathBuf::from("/tmp")));
        assert_eq!(for_error(&git), GIT_ERROR);

        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }
}
