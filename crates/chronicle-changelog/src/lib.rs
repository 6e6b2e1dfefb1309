//! Chronicle Changelog - Changelog synthesis and fragment workflow
//!
//! This crate provides:
//! - Commit classification into configurable categories
//! - Changelog synthesis behind a text generation capability, with a
//!   deterministic rendering when generation is unavailable
//! - The flat changelog document (parsing, section insertion, atomic writes)
//! - Multiple output formats (Markdown, JSON, HTML)
//! - The fragment workflow: create, validate, build, clean and release

pub mod classifier;
pub mod document;
pub mod formatter;
pub mod fragment;
pub mod pipeline;
pub mod synth;
pub mod types;

pub use classifier::{classify, classify_simple, filter_commits, group_commits, CommitGroup};
pub use document::{insert_section, parse_version_sections, VersionSection, DEFAULT_HEADER};
pub use formatter::{ChangelogFormatter, FormatterRegistry, MarkdownFormatter};
pub use fragment::{
    BuildReport, FileReport, Fragment, FragmentAuthor, FragmentCategory, FragmentDraft,
    FragmentStore, ValidationReport,
};
pub use pipeline::{collect_commits, generate, GenerateRequest, Generated};
pub use synth::{
    build_prompt, parse_response, GenerationReply, Synthesis, Synthesizer, TextGenerator,
};
pub use types::{ChangelogEntry, Section, SynthesisPath, LATEST_LABEL};
