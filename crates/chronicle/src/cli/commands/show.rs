//! Show command

use clap::Args;
use tracing::info;

use chronicle_changelog::document::read_existing;

use crate::cli::{output, Cli};

/// Print the changelog document
#[derive(Debug, Args)]
pub struct ShowCommand {}

impl ShowCommand {
    /// Execute the show command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing show command");
        let project = cli.project()?;
        let path = project.changelog_path();

        match read_existing(&path)? {
            Some(content) => print!("{}", content),
            None => {
                if !cli.quiet {
                    output::warning(&format!(
                        "No changelog found at {}. Run 'chronicle generate' to create one.",
                        path.display()
                    ));
                }
            }
        }

        Ok(())
    }
}
