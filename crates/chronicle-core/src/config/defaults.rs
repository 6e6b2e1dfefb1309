//! Default configuration values

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "chronicle.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "chronicle.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".chronicle.yaml";

/// Sentinel for "since the most recent version tag"
pub const LAST_TAG: &str = "last-tag";

pub const DEFAULT_SINCE: &str = LAST_TAG;
pub const DEFAULT_CHANGELOG_FILE: &str = "CHANGELOG.md";
pub const DEFAULT_DATABASE_FILE: &str = ".chronicle.db";
pub const DEFAULT_FRAGMENTS_DIR: &str = "changelog/unreleased";
pub const DEFAULT_API_ENDPOINT: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".chronicle.toml",
    ]
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Chronicle Configuration

project:
  name: my-project

generation:
  # Prefer the ANTHROPIC_API_KEY environment variable
  endpoint: https://api.anthropic.com
  model: claude-3-5-sonnet-latest
  max_tokens: 2000

changelog:
  file: CHANGELOG.md
  format: markdown
  default_since: last-tag
  include_file_changes: true
  exclude_patterns:
    - merge
    - bump version
    - release
  categories:
    feat: "✨ New Features"
    fix: "🐛 Bug Fixes"
    docs: "📝 Documentation"
    refactor: "🔧 Internal Changes"
    style: "💄 Style Changes"
    test: "🧪 Tests"
    chore: "🔧 Maintenance"

fragments:
  dir: changelog/unreleased

store:
  file: .chronicle.db
"#;
