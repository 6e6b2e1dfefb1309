//! Search command

use clap::Args;
use tracing::info;

use super::history::print_summaries;
use crate::cli::{output, Cli};

/// Search stored changelog entries
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Text to look for in entry content
    pub term: String,

    /// Search every project in the store
    #[arg(long)]
    pub all_projects: bool,
}

impl SearchCommand {
    /// Execute the search command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(term = %self.term, "executing search command");
        let project = cli.project()?;
        let store = project.store()?;

        let name = project.name();
        let scope = (!self.all_projects).then_some(name.as_str());
        let records = store.search(&self.term, scope)?;

        if cli.json() {
            return output::json(&records);
        }

        if records.is_empty() {
            if !cli.quiet {
                output::info(&format!("No entries mention '{}'", self.term));
            }
            return Ok(());
        }

        println!(
            "{}",
            output::header(&format!("{} entries matching '{}'", records.len(), self.term))
        );
        print_summaries(&records, self.all_projects);

        let needle = self.term.to_lowercase();
        for record in &records {
            let hits: Vec<&str> = record
                .content
                .lines()
                .filter(|line| line.to_lowercase().contains(&needle))
                .collect();
            if hits.is_empty() {
                continue;
            }
            println!();
            println!("{}", output::version_style().apply_to(&record.version));
            for line in hits {
                println!("  {}", line.trim());
            }
        }

        Ok(())
    }
}
