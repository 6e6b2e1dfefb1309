//! Stats command

use clap::Args;
use tracing::info;

use crate::cli::{output, Cli};

/// Show changelog statistics
#[derive(Debug, Args)]
pub struct StatsCommand {}

impl StatsCommand {
    /// Execute the stats command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing stats command");
        let project = cli.project()?;
        let store = project.store()?;
        let stats = store.stats(Some(project.name().as_str()))?;

        if cli.json() {
            return output::json(&stats);
        }

        println!("{}", output::header(&format!("Changelog statistics for {}", project.name())));
        println!("{}", output::key_value("Versions", &stats.total_versions.to_string()));
        println!("{}", output::key_value("Commits", &stats.total_commits.to_string()));
        println!(
            "{}",
            output::key_value("First version", stats.first_version.as_deref().unwrap_or("-"))
        );
        println!(
            "{}",
            output::key_value("Latest version", stats.latest_version.as_deref().unwrap_or("-"))
        );

        Ok(())
    }
}
