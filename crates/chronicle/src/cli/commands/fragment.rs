//! Fragment commands

use clap::{Args, Subcommand};
use console::style;
use dialoguer::{Confirm, Editor, Input, Select};
use serde_json::json;
use tracing::info;

use chronicle_changelog::fragment::{BREAKING_TEMPLATE, DESCRIPTION_TEMPLATE, MAX_TITLE_LEN};
use chronicle_changelog::{BuildReport, FragmentAuthor, FragmentCategory, FragmentDraft};
use chronicle_git::{default_identity, GitRepo};

use crate::cli::{output, Cli, Project};
use crate::exit_codes::{Exit, VALIDATION_ERROR};

/// Manage change fragments
#[derive(Debug, Args)]
pub struct FragmentCommand {
    #[command(subcommand)]
    pub command: FragmentSubcommand,
}

/// Fragment subcommands
#[derive(Debug, Subcommand)]
pub enum FragmentSubcommand {
    /// Write a new fragment (prompts for anything not given)
    New(NewCommand),

    /// Check every fragment in the holding area
    Validate(ValidateCommand),

    /// Add a version section built from the fragments to the changelog
    Build(BuildCommand),

    /// Delete every fragment
    Clean(CleanCommand),

    /// Build and clean in one step, rolling back on failure
    Release(BuildCommand),
}

/// Write a new fragment
#[derive(Debug, Args)]
pub struct NewCommand {
    /// Change category
    #[arg(short, long, value_parser = parse_category)]
    pub category: Option<FragmentCategory>,

    /// One-line summary, used as the changelog item
    #[arg(short, long)]
    pub title: Option<String>,

    /// Longer description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Mark the change as breaking
    #[arg(long)]
    pub breaking: bool,

    /// Migration notes for a breaking change
    #[arg(long, requires = "breaking")]
    pub breaking_notes: Option<String>,
}

/// Check every fragment
#[derive(Debug, Args)]
pub struct ValidateCommand {}

/// Build the changelog from fragments
#[derive(Debug, Args)]
pub struct BuildCommand {
    /// Version label for the new section
    #[arg(long = "version", value_name = "VERSION")]
    pub release_version: String,
}

/// Delete every fragment
#[derive(Debug, Args)]
pub struct CleanCommand {}

fn parse_category(value: &str) -> Result<FragmentCategory, String> {
    value.parse()
}

impl FragmentCommand {
    /// Execute the fragment command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let project = cli.project()?;

        match &self.command {
            FragmentSubcommand::New(cmd) => cmd.execute(cli, &project),
            FragmentSubcommand::Validate(cmd) => cmd.execute(cli, &project),
            FragmentSubcommand::Build(cmd) => cmd.execute(cli, &project, false),
            FragmentSubcommand::Clean(cmd) => cmd.execute(cli, &project),
            FragmentSubcommand::Release(cmd) => cmd.execute(cli, &project, true),
        }
    }
}

impl NewCommand {
    fn execute(&self, cli: &Cli, project: &Project) -> anyhow::Result<()> {
        info!(category = ?self.category, "executing fragment new command");
        let interactive = console::user_attended();
        // Prompt for the optional parts only when the essentials were asked for too
        let wizard = interactive && (self.category.is_none() || self.title.is_none());

        let category = match self.category {
            Some(category) => category,
            None if interactive => prompt_category()?,
            None => anyhow::bail!("--category is required when not running interactively"),
        };

        let title = match &self.title {
            Some(title) => title.clone(),
            None if interactive => prompt_title()?,
            None => anyhow::bail!("--title is required when not running interactively"),
        };

        let mut draft = FragmentDraft::new(category, title);

        let description = match &self.description {
            Some(description) => Some(description.clone()),
            None if wizard => Editor::new().edit(DESCRIPTION_TEMPLATE)?,
            None => None,
        };
        if let Some(description) = description {
            draft = draft.with_description(description);
        }

        let breaking = self.breaking
            || (wizard
                && Confirm::new()
                    .with_prompt("Is this a breaking change?")
                    .default(false)
                    .interact()?);
        if breaking {
            let notes = match &self.breaking_notes {
                Some(notes) => Some(notes.clone()),
                None if wizard => Editor::new()
                    .edit(BREAKING_TEMPLATE)?
                    .filter(|notes| notes.trim() != BREAKING_TEMPLATE),
                None => None,
            };
            draft = draft.breaking(notes);
        }

        let author = current_author(project);
        let path = project.fragments().create(&draft, &author)?;

        if cli.json() {
            return output::json(&json!({
                "file": path,
                "category": category.key(),
                "title": draft.title.trim(),
                "breaking": draft.breaking,
            }));
        }

        if !cli.quiet {
            println!(
                "{} Created {} fragment {}",
                style("✓").green().bold(),
                category.label(),
                output::path_style().apply_to(path.display())
            );
            println!("  Edit the file to add detail, then run {}", style("chronicle fragment validate").cyan());
        }
        Ok(())
    }
}

fn prompt_category() -> anyhow::Result<FragmentCategory> {
    let items: Vec<String> = FragmentCategory::ALL
        .iter()
        .map(|c| format!("{} - {}", c.label(), c.description()))
        .collect();
    let selection = Select::new()
        .with_prompt("What type of change is this?")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(FragmentCategory::ALL[selection])
}

fn prompt_title() -> anyhow::Result<String> {
    let title = Input::<String>::new()
        .with_prompt("Brief description of the change")
        .validate_with(|input: &String| -> Result<(), String> {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                Err("Please provide a description".to_string())
            } else if trimmed.chars().count() > MAX_TITLE_LEN {
                Err(format!("Please keep the title under {} characters", MAX_TITLE_LEN))
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(title)
}

/// Fragment author from the project's git config, then the user's global one
fn current_author(project: &Project) -> FragmentAuthor {
    let (name, email) = match GitRepo::discover(&project.root) {
        Ok(repo) => repo.user_identity(),
        Err(_) => default_identity(),
    };
    FragmentAuthor::new(name, email)
}

impl ValidateCommand {
    fn execute(&self, cli: &Cli, project: &Project) -> anyhow::Result<()> {
        info!("executing fragment validate command");
        let report = project.fragments().validate()?;

        if cli.json() {
            let files: Vec<_> = report
                .files
                .iter()
                .map(|f| json!({ "file": f.file, "valid": f.is_valid(), "problems": f.problems }))
                .collect();
            output::json(&json!({ "valid": report.is_valid(), "files": files }))?;
        } else if !cli.quiet {
            if report.files.is_empty() {
                output::info("No fragments to validate");
            }
            for file in &report.files {
                if file.is_valid() {
                    println!("{} {}", style("✓").green().bold(), file.file);
                } else {
                    println!("{} {}", style("✗").red().bold(), file.file);
                    for problem in &file.problems {
                        println!("    {}", style(problem).red());
                    }
                }
            }
        }

        if !report.is_valid() {
            if !cli.json() {
                output::error(&format!(
                    "{} of {} fragments failed validation",
                    report.invalid_count(),
                    report.files.len()
                ));
            }
            return Err(Exit(VALIDATION_ERROR).into());
        }

        if !cli.json() && !cli.quiet && !report.files.is_empty() {
            output::success("All fragments are valid");
        }
        Ok(())
    }
}

impl BuildCommand {
    fn execute(&self, cli: &Cli, project: &Project, release: bool) -> anyhow::Result<()> {
        info!(version = %self.release_version, release, "executing fragment build command");
        let fragments = project.fragments();
        let document = project.changelog_path();

        let report = if release {
            fragments.release(&self.release_version, &document)?
        } else {
            fragments.build(&self.release_version, &document)?
        };

        print_build(cli, project, &self.release_version, &report, release)
    }
}

fn print_build(
    cli: &Cli,
    project: &Project,
    version: &str,
    report: &BuildReport,
    released: bool,
) -> anyhow::Result<()> {
    if cli.json() {
        return output::json(&json!({
            "version": version,
            "included": report.included,
            "skipped": report.skipped,
            "released": released,
            "section": report.section,
        }));
    }

    if cli.quiet {
        return Ok(());
    }

    for file in &report.skipped {
        output::warning(&format!("Skipped {} (could not be parsed)", file));
    }
    println!(
        "{} Added {} with {} fragments to {}",
        style("✓").green().bold(),
        output::version_style().apply_to(version),
        report.included,
        output::path_style().apply_to(project.changelog_path().display())
    );
    if released {
        output::info("Fragments were removed from the holding area");
    }
    Ok(())
}

impl CleanCommand {
    fn execute(&self, cli: &Cli, project: &Project) -> anyhow::Result<()> {
        info!("executing fragment clean command");
        let removed = project.fragments().clean()?;

        if cli.json() {
            return output::json(&json!({ "removed": removed }));
        }
        if !cli.quiet {
            if removed == 0 {
                output::info("No fragments to clean");
            } else {
                output::success(&format!("Removed {} fragments", removed));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    use crate::cli::Commands;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("chronicle").chain(args.iter().copied()))
    }

    fn fragment_command(cli: &Cli) -> &FragmentSubcommand {
        match &cli.command {
            Commands::Fragment(cmd) => &cmd.command,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_new_with_arguments() {
        let cli = parse(&[
            "fragment", "new", "--category", "fixed", "--title", "Fix crash", "--breaking",
        ]);
        match fragment_command(&cli) {
            FragmentSubcommand::New(cmd) => {
                assert_eq!(cmd.category, Some(FragmentCategory::Fixed));
                assert_eq!(cmd.title.as_deref(), Some("Fix crash"));
                assert!(cmd.breaking);
            }
            other => panic!("unexpected subcommand: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let result = Cli::try_parse_from(["chronicle", "fragment", "new", "--category", "misc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_validate_release_flow() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_str().unwrap();

        let new = parse(&[
            "-q", "-C", root, "fragment", "new", "-c", "added", "-t", "Dark mode support",
            "-d", "Adds a theme toggle to the settings page",
        ]);
        new.execute().unwrap();

        let project = parse(&["-C", root, "show"]).project().unwrap();
        let files = project.fragments().list().unwrap();
        assert_eq!(files.len(), 1);

        parse(&["-q", "-C", root, "fragment", "validate"]).execute().unwrap();
        parse(&["-q", "-C", root, "fragment", "release", "--version", "v1.0.0"])
            .execute()
            .unwrap();

        assert!(project.fragments().list().unwrap().is_empty());
        let changelog = std::fs::read_to_string(project.changelog_path()).unwrap();
        assert!(changelog.contains("## v1.0.0 - "));
        assert!(changelog.contains("- Dark mode support"));
    }

    #[test]
    fn test_validate_failure_exits_with_validation_code() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("changelog/unreleased");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bad.md"), "---\ncategory: misc\n---\nno heading\n").unwrap();

        let err = parse(&["-q", "-C", temp.path().to_str().unwrap(), "fragment", "validate"])
            .execute()
            .unwrap_err();
        assert_eq!(crate::exit_codes::for_error(&err), VALIDATION_ERROR);
    }
}
