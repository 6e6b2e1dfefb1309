//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use dialoguer::Confirm;
use tracing::info;

use chronicle_core::config::{Config, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_YAML};

use crate::cli::{directory_name, Cli};

/// Create a Chronicle configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Write TOML instead of YAML
    #[arg(long)]
    pub toml: bool,

    /// Project name (defaults to the project directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, toml = self.toml, "executing init command");
        let root = cli.project_root()?;
        let file_name = if self.toml {
            DEFAULT_CONFIG_TOML
        } else {
            DEFAULT_CONFIG_YAML
        };
        let config_path = self.output.clone().unwrap_or_else(|| root.join(file_name));

        if config_path.exists() && !self.force {
            if !console::user_attended() {
                anyhow::bail!(
                    "Configuration file already exists at {}. Use --force to overwrite.",
                    config_path.display()
                );
            }

            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "Configuration file already exists at {}. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
        }

        let name = self
            .name
            .clone()
            .unwrap_or_else(|| directory_name(&root));
        let content = render_config(&name, self.toml)?;
        std::fs::write(&config_path, &content)?;

        if !cli.quiet {
            println!(
                "{} Created configuration at {}",
                style("✓").green().bold(),
                style(config_path.display()).cyan()
            );
            println!();
            println!("Next steps:");
            println!("  1. Edit {} to customize categories and exclusions", config_path.display());
            println!("  2. Export {} to enable AI drafting", style("ANTHROPIC_API_KEY").cyan());
            println!("  3. Run {} to draft your first entry", style("chronicle generate").cyan());
        }

        Ok(())
    }
}

/// Render the default configuration for a project
fn render_config(name: &str, toml: bool) -> anyhow::Result<String> {
    if toml {
        let mut config: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE)?;
        config.project.name = name.to_string();
        return Ok(toml::to_string_pretty(&config)?);
    }

    Ok(DEFAULT_CONFIG_TEMPLATE.replacen(
        "  name: my-project\n",
        &format!("  name: {}\n", serde_yaml::to_string(name)?.trim_end()),
        1,
    ))
}
