//! Generate command

use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{info, warn};

use chronicle_changelog::{
    generate, group_commits, FormatterRegistry, GenerateRequest, Generated, Synthesizer,
};
use chronicle_core::error::{ChangelogError, GitError};
use chronicle_core::ChronicleError;
use chronicle_git::GitRepo;
use chronicle_store::IndexOutcome;

use crate::anthropic::AnthropicClient;
use crate::cli::{output, Cli, Project};

/// Generate a changelog entry from git history
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Start of the range: a tag, a revision like HEAD~10, or last-tag
    #[arg(long)]
    pub since: Option<String>,

    /// Maximum number of commits to read
    #[arg(long = "commits", value_name = "N")]
    pub max_commits: Option<usize>,

    /// Version label for the entry
    #[arg(long = "version", value_name = "VERSION")]
    pub release_version: Option<String>,

    /// Print the entry without writing the changelog or the store
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateCommand {
    /// Execute the generate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            since = ?self.since,
            version = ?self.release_version,
            dry_run = self.dry_run,
            "executing generate command"
        );
        let project = cli.project()?;

        if !GitRepo::is_repository(&project.root) {
            return Err(GitError::NotARepository(project.root.clone()).into());
        }
        let repo = GitRepo::discover(&project.root)?;

        let config = &project.config;
        let since = self
            .since
            .clone()
            .unwrap_or_else(|| config.changelog.default_since.clone());

        let client = AnthropicClient::new(&config.generation, config.resolved_api_key());
        let synthesizer = Synthesizer::new(client, project.name(), config.changelog.clone());

        let request = GenerateRequest {
            since: &since,
            max_commits: self.max_commits,
            version: self.release_version.as_deref(),
        };

        let spinner = spinner(cli)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let result = runtime.block_on(generate(&repo, &synthesizer, request));
        spinner.finish_and_clear();

        let generated = match result {
            Ok(generated) => generated,
            Err(ChronicleError::Changelog(
                e @ (ChangelogError::NoCommitsFound { .. } | ChangelogError::NoCommitsAfterFilter),
            )) => {
                warn!(error = %e, "nothing to generate");
                if !cli.quiet {
                    output::warning(&e.to_string());
                }
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if self.dry_run {
            return self.preview(cli, &project, &generated);
        }

        let store = project.store()?;
        let changelog_path = project.changelog_path();
        let outcome = store.append_and_index(
            &changelog_path,
            &generated.synthesis.entry,
            &project.name(),
            generated.commit_count(),
        )?;

        let entry = &generated.synthesis.entry;
        if cli.json() {
            return output::json(&json!({
                "id": outcome.id(),
                "indexed": matches!(outcome, IndexOutcome::Inserted(_)),
                "path": generated.synthesis.path,
                "commit_count": generated.commit_count(),
                "entry": entry,
            }));
        }

        if !cli.quiet {
            println!(
                "{} Added {} to {} ({} commits, {} items, {} draft)",
                style("✓").green().bold(),
                output::version_style().apply_to(entry.label()),
                output::path_style().apply_to(changelog_path.display()),
                generated.commit_count(),
                entry.item_count(),
                generated.synthesis.path
            );
            if let IndexOutcome::AlreadyIndexed(id) = outcome {
                output::warning(&format!(
                    "{} was already stored (record {}); the index was left unchanged",
                    entry.label(),
                    id
                ));
                if entry.version.is_none() {
                    output::info("Pass --version to index each run separately");
                }
            }
        }

        Ok(())
    }

    fn preview(&self, cli: &Cli, project: &Project, generated: &Generated) -> anyhow::Result<()> {
        let entry = &generated.synthesis.entry;
        let categories = &project.config.changelog.categories;

        if cli.json() {
            let groups: Vec<_> = group_commits(&generated.commits, categories)
                .into_iter()
                .map(|group| {
                    json!({
                        "key": group.key,
                        "label": group.label,
                        "commits": group.commits,
                    })
                })
                .collect();
            return output::json(&json!({
                "path": generated.synthesis.path,
                "commit_count": generated.commit_count(),
                "groups": groups,
                "entry": entry,
            }));
        }

        let registry = FormatterRegistry::new();
        let format = &project.config.changelog.format;
        let formatter = registry
            .get(format)
            .ok_or_else(|| anyhow::anyhow!("Unknown changelog format: {}", format))?;

        println!("{}", formatter.format(entry));
        if !cli.quiet {
            println!(
                "{}",
                style(format!(
                    "Dry run: {} commits, {} draft, nothing written",
                    generated.commit_count(),
                    generated.synthesis.path
                ))
                .dim()
            );
        }
        Ok(())
    }
}

/// Spinner shown while the entry is drafted
fn spinner(cli: &Cli) -> anyhow::Result<ProgressBar> {
    if cli.quiet || cli.json() {
        return Ok(ProgressBar::hidden());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Drafting changelog entry...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}
