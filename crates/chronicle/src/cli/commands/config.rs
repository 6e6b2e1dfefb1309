//! Config command

use clap::Args;
use tracing::info;

use chronicle_core::config::API_KEY_ENV;

use crate::cli::{output, Cli};

/// Show the effective configuration
#[derive(Debug, Args)]
pub struct ConfigCommand {}

impl ConfigCommand {
    /// Execute the config command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing config command");
        let project = cli.project()?;
        let mut config = project.config.clone();

        // Never echo the key itself
        let key_source = if std::env::var(API_KEY_ENV).is_ok_and(|k| !k.trim().is_empty()) {
            Some(API_KEY_ENV)
        } else if config.generation.api_key.is_some() {
            Some("config file")
        } else {
            None
        };
        config.generation.api_key = key_source.map(|_| "********".to_string());

        if cli.json() {
            return output::json(&config);
        }

        let source = project
            .config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults (no config file found)".to_string());

        println!("{}", output::header("Chronicle configuration"));
        println!("{}", output::key_value("Source", &source));
        println!("{}", output::key_value("Project root", &project.root.display().to_string()));
        println!("{}", output::key_value("Project", &project.name()));
        println!(
            "{}",
            output::key_value("Changelog", &project.changelog_path().display().to_string())
        );
        println!(
            "{}",
            output::key_value(
                "Database",
                &config.database_path(&project.root).display().to_string()
            )
        );
        println!(
            "{}",
            output::key_value(
                "Fragments",
                &config.fragments_path(&project.root).display().to_string()
            )
        );
        println!("{}", output::key_value("Format", &config.changelog.format));
        println!("{}", output::key_value("Default since", &config.changelog.default_since));
        println!(
            "{}",
            output::key_value(
                "Include file changes",
                &config.changelog.include_file_changes.to_string()
            )
        );
        println!("{}", output::key_value("Model", &config.generation.model));
        println!("{}", output::key_value("Endpoint", &config.generation.endpoint));
        println!(
            "{}",
            output::key_value("API key", key_source.unwrap_or("not set (fallback drafting)"))
        );

        println!();
        println!("{}", output::header("Categories"));
        for (key, label) in config.changelog.categories.iter() {
            println!("{}", output::key_value(key, label));
        }

        println!();
        println!("{}", output::header("Exclude patterns"));
        for pattern in &config.changelog.exclude_patterns {
            println!("  - {}", pattern);
        }

        Ok(())
    }
}
