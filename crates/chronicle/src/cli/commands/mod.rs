//! CLI commands

mod config;
mod fragment;
mod generate;
mod history;
mod import;
mod init;
mod search;
mod show;
mod show_version;
mod stats;

pub use config::ConfigCommand;
pub use fragment::FragmentCommand;
pub use generate::GenerateCommand;
pub use history::HistoryCommand;
pub use import::ImportCommand;
pub use init::InitCommand;
pub use search::SearchCommand;
pub use show::ShowCommand;
pub use show_version::ShowVersionCommand;
pub use stats::StatsCommand;
