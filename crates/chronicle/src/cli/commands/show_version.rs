//! Show-version command

use clap::Args;
use console::style;
use tracing::info;

use chronicle_changelog::FormatterRegistry;

use crate::cli::{output, Cli};
use crate::exit_codes::{Exit, ERROR};

/// Show the stored entry for one version
#[derive(Debug, Args)]
pub struct ShowVersionCommand {
    /// Version label, e.g. v1.2.0
    #[arg(value_name = "VERSION")]
    pub label: String,
}

impl ShowVersionCommand {
    /// Execute the show-version command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(version = %self.label, "executing show-version command");
        let project = cli.project()?;
        let store = project.store()?;
        let records = store.by_version(&self.label, Some(project.name().as_str()))?;

        if cli.json() {
            return output::json(&records);
        }

        if records.is_empty() {
            output::error(&format!("Version {} not found", self.label));
            return Err(Exit(ERROR).into());
        }

        let registry = FormatterRegistry::new();
        let format = &project.config.changelog.format;
        let formatter = registry
            .get(format)
            .ok_or_else(|| anyhow::anyhow!("Unknown changelog format: {}", format))?;

        for (i, record) in records.iter().enumerate() {
            if i > 0 {
                println!();
            }
            if !cli.quiet {
                println!(
                    "{}",
                    style(format!(
                        "Record {} ({} commits, stored {})",
                        record.id,
                        record.commit_count,
                        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                    ))
                    .dim()
                );
            }
            if format == "markdown" {
                println!("{}", record.content.trim_end());
            } else {
                println!("{}", formatter.format(&record.to_entry()).trim_end());
            }
        }

        Ok(())
    }
}
