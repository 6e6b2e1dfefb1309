//! Chronicle Core - Core library for changelog synthesis
//!
//! This crate provides the error taxonomy and project configuration shared by
//! the other Chronicle crates.

pub mod config;
pub mod error;

pub use config::{CategoryMap, Config};
pub use error::{ChronicleError, Result};
