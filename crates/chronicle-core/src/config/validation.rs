//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Output formats the CLI knows how to emit
pub const VALID_FORMATS: [&str; 3] = ["markdown", "json", "html"];

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_project(config)?;
    validate_generation(config)?;
    validate_changelog(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_project(config: &Config) -> Result<()> {
    if config.project.name.trim().is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()).into());
    }
    Ok(())
}

fn validate_generation(config: &Config) -> Result<()> {
    if let Some(key) = &config.generation.api_key {
        if !key.starts_with("sk-ant-") {
            return Err(ConfigError::InvalidValue {
                field: "generation.api_key".to_string(),
                message: "must start with sk-ant-".to_string(),
            }
            .into());
        }
    }

    if config.generation.max_tokens == 0 {
        return Err(ConfigError::InvalidValue {
            field: "generation.max_tokens".to_string(),
            message: "must be greater than zero".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_changelog(config: &Config) -> Result<()> {
    if !VALID_FORMATS.contains(&config.changelog.format.as_str()) {
        return Err(ConfigError::InvalidValue {
            field: "changelog.format".to_string(),
            message: format!("must be one of: {}", VALID_FORMATS.join(", ")),
        }
        .into());
    }

    if config.changelog.categories.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "changelog.categories".to_string(),
            message: "at least one category is required".to_string(),
        }
        .into());
    }

    if config.changelog.default_since.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "changelog.default_since".to_string(),
            message: "cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryMap;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.project.name = "demo".to_string();
        config
    }

    #[test]
    fn test_default_with_name_is_valid() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_project_name() {
        assert!(validate_config(&Config::default()).is_err());
    }

    #[test]
    fn test_invalid_format() {
        let mut config = valid_config();
        config.changelog.format = "pdf".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_api_key_prefix() {
        let mut config = valid_config();
        config.generation.api_key = Some("not-a-key".to_string());
        assert!(validate_config(&config).is_err());

        config.generation.api_key = Some("sk-ant-abc".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_categories() {
        let mut config = valid_config();
        config.changelog.categories = CategoryMap::new();
        assert!(validate_config(&config).is_err());
    }
}
