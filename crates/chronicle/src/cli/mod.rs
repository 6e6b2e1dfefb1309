//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use chronicle_changelog::FragmentStore;
use chronicle_core::config::load_config_or_default;
use chronicle_core::Config;
use chronicle_store::ChangelogStore;

use commands::{
    ConfigCommand, FragmentCommand, GenerateCommand, HistoryCommand, ImportCommand, InitCommand,
    SearchCommand, ShowCommand, ShowVersionCommand, StatsCommand,
};

/// Chronicle - Changelog synthesis from git history and change fragments
#[derive(Debug, Parser)]
#[command(name = "chronicle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a Chronicle configuration file
    Init(InitCommand),

    /// Generate a changelog entry from git history
    Generate(GenerateCommand),

    /// Print the changelog document
    Show(ShowCommand),

    /// Show the effective configuration
    Config(ConfigCommand),

    /// List stored changelog entries
    History(HistoryCommand),

    /// Show the stored entry for one version
    ShowVersion(ShowVersionCommand),

    /// Search stored changelog entries
    Search(SearchCommand),

    /// Show changelog statistics
    Stats(StatsCommand),

    /// Index an existing changelog document into the store
    Import(ImportCommand),

    /// Manage change fragments
    Fragment(FragmentCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Generate(ref cmd) => cmd.execute(&self),
            Commands::Show(ref cmd) => cmd.execute(&self),
            Commands::Config(ref cmd) => cmd.execute(&self),
            Commands::History(ref cmd) => cmd.execute(&self),
            Commands::ShowVersion(ref cmd) => cmd.execute(&self),
            Commands::Search(ref cmd) => cmd.execute(&self),
            Commands::Stats(ref cmd) => cmd.execute(&self),
            Commands::Import(ref cmd) => cmd.execute(&self),
            Commands::Fragment(ref cmd) => cmd.execute(&self),
        }
    }

    /// Project root: `--directory` when given, otherwise the current directory
    pub fn project_root(&self) -> anyhow::Result<PathBuf> {
        let root = match &self.directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        if !root.is_dir() {
            anyhow::bail!("Project root {} is not a directory", root.display());
        }
        Ok(root)
    }

    /// Resolve the project root and load its configuration
    pub fn project(&self) -> anyhow::Result<Project> {
        let root = self.project_root()?;
        let (config, config_path) = load_config_or_default(&root)?;
        Ok(Project::new(root, config, config_path))
    }

    /// Whether JSON output was requested
    pub fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

/// A project root with its loaded configuration
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl Project {
    pub fn new(root: PathBuf, config: Config, config_path: Option<PathBuf>) -> Self {
        debug!(
            root = %root.display(),
            config = ?config_path,
            "resolved project"
        );
        Self {
            root,
            config,
            config_path,
        }
    }

    /// Project name used to scope stored records.
    ///
    /// Falls back to the root directory name when the config leaves it empty.
    pub fn name(&self) -> String {
        let configured = self.config.project.name.trim();
        if !configured.is_empty() {
            return configured.to_string();
        }
        directory_name(&self.root)
    }

    /// Path of the changelog document
    pub fn changelog_path(&self) -> PathBuf {
        self.config.changelog_path(&self.root)
    }

    /// Open the record store
    pub fn store(&self) -> anyhow::Result<ChangelogStore> {
        let path = self.config.database_path(&self.root);
        info!(path = %path.display(), "opening changelog store");
        Ok(ChangelogStore::open(&path)?)
    }

    /// The fragment holding area
    pub fn fragments(&self) -> FragmentStore {
        FragmentStore::new(self.config.fragments_path(&self.root))
    }
}

/// Last path component of `root`, or `project` when there is none
pub fn directory_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_project_name_falls_back_to_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("my-service");
        std::fs::create_dir(&root).unwrap();

        let mut project = Project::new(root, Config::default(), None);
        assert_eq!(project.name(), "my-service");

        project.config.project.name = "billing".to_string();
        assert_eq!(project.name(), "billing");
    }

    #[test]
    fn test_project_root_from_directory_flag() {
        let temp = TempDir::new().unwrap();
        let cli = Cli::parse_from([
            "chronicle",
            "-C",
            temp.path().to_str().unwrap(),
            "show",
        ]);
        assert_eq!(cli.project_root().unwrap(), temp.path());

        let project = cli.project().unwrap();
        assert_eq!(project.changelog_path(), temp.path().join("CHANGELOG.md"));
        assert!(project.config_path.is_none());
    }

    #[test]
    fn test_project_root_must_exist() {
        let cli = Cli::parse_from(["chronicle", "-C", "/definitely/not/here", "show"]);
        assert!(cli.project_root().is_err());
    }
}
