//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: Config = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find the configuration file for a project root.
///
/// Only the root itself is inspected, never its parents:
///   1. `<root>/<name>`          (e.g. `chronicle.yaml`)
///   2. `<root>/.github/<name>`  (e.g. `.github/chronicle.yaml`)
///
/// The first match wins.
pub fn find_config(root: &Path) -> Option<PathBuf> {
    debug!(root = %root.display(), "searching for config file");

    for name in config_file_names() {
        let config_path = root.join(name);
        if config_path.exists() {
            info!(path = %config_path.display(), "found config file");
            return Some(config_path);
        }
    }

    for name in config_file_names() {
        let github_path = root.join(".github").join(name);
        if github_path.exists() {
            info!(path = %github_path.display(), "found config file in .github/");
            return Some(github_path);
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration or use defaults.
///
/// A config file that exists but fails to parse or validate is still an
/// error; only a missing file falls back to defaults.
pub fn load_config_or_default(root: &Path) -> Result<(Config, Option<PathBuf>)> {
    match find_config(root) {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            warn!(root = %root.display(), "no config found, using defaults");
            Ok((Config::default(), None))
        }
    }
}
