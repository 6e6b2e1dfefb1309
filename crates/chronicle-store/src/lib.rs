//! Chronicle Store - Queryable index of changelog entries
//!
//! A SQLite database mirroring the version sections of the changelog
//! document, scoped by project name. Supports history listing, lookup by
//! version, text search and aggregate statistics, and can be rebuilt from
//! the document at any time by import.

mod error;
mod store;

pub use error::{Result, StoreError};
pub use store::{ChangelogRecord, ChangelogStore, IndexOutcome, StoreStats};
