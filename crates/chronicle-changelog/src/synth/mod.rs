//! Changelog synthesis
//!
//! Turns a batch of commits into one [`ChangelogEntry`]. The preferred path
//! asks a [`TextGenerator`] to draft the entry; when the generator rejects
//! our credentials the entry is rendered deterministically instead. Both
//! paths go through [`parse_response`] so downstream code sees one shape.

mod fallback;
mod prompt;
mod response;

pub use fallback::render_fallback;
pub use prompt::{build_prompt, format_commit, PromptInput};
pub use response::{parse_response, parse_sections};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use chronicle_core::config::ChangelogConfig;
use chronicle_core::error::GenerationError;
use chronicle_git::CommitInfo;

use crate::types::{ChangelogEntry, SynthesisPath};

/// Result type for synthesis
pub type Result<T> = std::result::Result<T, GenerationError>;

/// What a generator handed back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationReply {
    /// Drafted text
    Text(String),
    /// A reply that carried no text, tagged with its content kind
    NonText {
        /// Content kind reported by the backend
        kind: String,
    },
}

/// Capability that drafts text from a prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Draft a reply for `prompt`
    async fn generate(&self, prompt: &str) -> Result<GenerationReply>;
}

/// A synthesized entry and the path that produced it
#[derive(Debug, Clone)]
pub struct Synthesis {
    /// The entry
    pub entry: ChangelogEntry,
    /// Which path produced it
    pub path: SynthesisPath,
}

/// Drafts changelog entries from commits
pub struct Synthesizer {
    generator: Box<dyn TextGenerator>,
    project: String,
    config: ChangelogConfig,
    date: Option<NaiveDate>,
}

impl Synthesizer {
    /// Create a synthesizer over a generation capability
    pub fn new(
        generator: impl TextGenerator + 'static,
        project: impl Into<String>,
        config: ChangelogConfig,
    ) -> Self {
        Self {
            generator: Box::new(generator),
            project: project.into(),
            config,
            date: None,
        }
    }

    /// Pin the entry date instead of using today
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Changelog settings in use
    pub fn config(&self) -> &ChangelogConfig {
        &self.config
    }

    fn date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// The prompt that would be sent for these commits
    pub fn prompt(&self, commits: &[CommitInfo], version: Option<&str>) -> String {
        build_prompt(&PromptInput {
            project: &self.project,
            version,
            date: self.date(),
            commits,
            categories: &self.config.categories,
            include_files: self.config.include_file_changes,
        })
    }

    /// Synthesize one entry for `commits`.
    ///
    /// Authentication failures switch to the deterministic rendering; every
    /// other failure is returned.
    #[instrument(skip(self, commits), fields(commit_count = commits.len()))]
    pub async fn synthesize(
        &self,
        commits: &[CommitInfo],
        version: Option<&str>,
    ) -> Result<Synthesis> {
        let date = self.date();
        info!(project = %self.project, "synthesizing changelog entry");

        let prompt = self.prompt(commits, version);
        debug!(prompt_len = prompt.len(), "built generation prompt");

        match self.generator.generate(&prompt).await {
            Ok(GenerationReply::Text(text)) => {
                let entry = parse_response(&text, version, date);
                debug!(sections = entry.sections.len(), "parsed generated entry");
                Ok(Synthesis {
                    entry,
                    path: SynthesisPath::Ai,
                })
            }
            Ok(GenerationReply::NonText { kind }) => {
                Err(GenerationError::UnexpectedResponseShape(kind))
            }
            Err(e) if e.is_authentication() => {
                warn!(error = %e, "generation authentication failed, rendering changelog from commits");
                let text = render_fallback(commits, &self.config.categories, version, date);
                Ok(Synthesis {
                    entry: parse_response(&text, version, date),
                    path: SynthesisPath::Fallback,
                })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::config::default_categories;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Generator returning a fixed reply and remembering the prompt
    struct ScriptedGenerator {
        reply: std::result::Result<GenerationReply, GenerationError>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(reply: std::result::Result<GenerationReply, GenerationError>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<GenerationReply> {
            self.seen.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn commits() -> Vec<CommitInfo> {
        vec![
            CommitInfo::new("aaaaaaaa1111", "feat: add search", "T", "t@e.com", Utc::now()),
            CommitInfo::new("bbbbbbbb2222", "fix: null pointer", "T", "t@e.com", Utc::now()),
        ]
    }

    fn config() -> ChangelogConfig {
        ChangelogConfig {
            categories: default_categories(),
            ..ChangelogConfig::default()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[tokio::test]
    async fn test_ai_path_parses_reply() {
        let reply = "## v1.0.0 - 2024-01-15\n\n### ✨ New Features\n- Search across projects\n";
        let synth = Synthesizer::new(
            ScriptedGenerator::new(Ok(GenerationReply::Text(reply.to_string()))),
            "demo",
            config(),
        )
        .with_date(date());

        let result = synth.synthesize(&commits(), Some("v1.0.0")).await.unwrap();
        assert_eq!(result.path, SynthesisPath::Ai);
        assert_eq!(result.entry.raw, reply);
        assert_eq!(result.entry.sections[0].items, vec!["Search across projects"]);
    }

    #[tokio::test]
    async fn test_authentication_failure_uses_fallback() {
        let synth = Synthesizer::new(
            ScriptedGenerator::new(Err(GenerationError::Failed(
                "401 {\"type\":\"authentication_error\"}".to_string(),
            ))),
            "demo",
            config(),
        )
        .with_date(date());

        let result = synth.synthesize(&commits(), None).await.unwrap();
        assert_eq!(result.path, SynthesisPath::Fallback);
        assert!(result.entry.raw.starts_with("## Latest Changes - 2024-01-15"));

        let titles: Vec<_> = result
            .entry
            .sections
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["✨ New Features", "🐛 Bug Fixes"]);
        assert_eq!(result.entry.sections[0].items, vec!["feat: add search"]);
        assert_eq!(result.entry.sections[1].items, vec!["fix: null pointer"]);
    }

    #[tokio::test]
    async fn test_other_failures_propagate() {
        let synth = Synthesizer::new(
            ScriptedGenerator::new(Err(GenerationError::Failed("overloaded".to_string()))),
            "demo",
            config(),
        );

        let err = synth.synthesize(&commits(), None).await.unwrap_err();
        assert!(matches!(err, GenerationError::Failed(_)));
    }

    #[tokio::test]
    async fn test_non_text_reply_is_rejected() {
        let synth = Synthesizer::new(
            ScriptedGenerator::new(Ok(GenerationReply::NonText {
                kind: "tool_use".to_string(),
            })),
            "demo",
            config(),
        );

        let err = synth.synthesize(&commits(), None).await.unwrap_err();
        assert!(matches!(err, GenerationError::UnexpectedResponseShape(kind) if kind == "tool_use"));
    }

    #[tokio::test]
    async fn test_prompt_reaches_generator_once() {
        let generator = std::sync::Arc::new(ScriptedGenerator::new(Ok(GenerationReply::Text(
            String::new(),
        ))));

        struct Shared(std::sync::Arc<ScriptedGenerator>);

        #[async_trait]
        impl TextGenerator for Shared {
            async fn generate(&self, prompt: &str) -> Result<GenerationReply> {
                self.0.generate(prompt).await
            }
        }

        let synth = Synthesizer::new(Shared(generator.clone()), "demo", config()).with_date(date());
        synth.synthesize(&commits(), Some("v2.0.0")).await.unwrap();

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], synth.prompt(&commits(), Some("v2.0.0")));
    }
}
