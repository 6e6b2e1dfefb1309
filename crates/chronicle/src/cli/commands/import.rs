//! Import command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use chronicle_changelog::document::read_existing;

use crate::cli::{output, Cli};

/// Index an existing changelog document into the store
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Document to import (defaults to the configured changelog file)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl ImportCommand {
    /// Execute the import command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(file = ?self.file, "executing import command");
        let project = cli.project()?;
        let path = match &self.file {
            Some(file) => project.root.join(file),
            None => project.changelog_path(),
        };

        let Some(document) = read_existing(&path)? else {
            anyhow::bail!("No changelog found at {}", path.display());
        };

        let store = project.store()?;
        let imported = store.import_document(&document, &project.name())?;

        if cli.json() {
            return output::json(&serde_json::json!({
                "file": path,
                "imported": imported,
            }));
        }

        if !cli.quiet {
            if imported == 0 {
                output::info("Every version section is already stored");
            } else {
                println!(
                    "{} Imported {} version sections from {}",
                    style("✓").green().bold(),
                    imported,
                    output::path_style().apply_to(path.display())
                );
            }
        }

        Ok(())
    }
}
