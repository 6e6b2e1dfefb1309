//! History command

use clap::Args;
use console::style;
use tracing::info;

use chronicle_store::ChangelogRecord;

use crate::cli::{output, Cli};

/// List stored changelog entries
#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Show at most this many entries
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,

    /// Include entries from every project in the store
    #[arg(long)]
    pub all_projects: bool,
}

impl HistoryCommand {
    /// Execute the history command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(limit = self.limit, all_projects = self.all_projects, "executing history command");
        let project = cli.project()?;
        let store = project.store()?;

        let name = project.name();
        let scope = (!self.all_projects).then_some(name.as_str());
        let mut records = store.all(scope)?;
        records.truncate(self.limit);

        if cli.json() {
            return output::json(&records);
        }

        if records.is_empty() {
            if !cli.quiet {
                output::info("No changelog history found. Run 'chronicle generate' or 'chronicle import' first.");
            }
            return Ok(());
        }

        println!("{}", output::header("Changelog history"));
        print_summaries(&records, self.all_projects);
        Ok(())
    }
}

/// One line per record: version, date, counts
pub(super) fn print_summaries(records: &[ChangelogRecord], with_project: bool) {
    for record in records {
        let project = if with_project {
            format!(" [{}]", record.project)
        } else {
            String::new()
        };
        println!(
            "  {} {}{} {}",
            output::version_style().apply_to(&record.version),
            style(record.date).dim(),
            project,
            style(format!(
                "({} commits, {} categories)",
                record.commit_count,
                record.sections.len()
            ))
            .dim()
        );
    }
}
