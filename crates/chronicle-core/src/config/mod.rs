//! Configuration system for Chronicle

mod categories;
pub mod defaults;
mod loader;
mod types;
pub mod validation;

pub use categories::CategoryMap;
pub use defaults::*;
pub use loader::*;
pub use types::*;
pub use validation::*;
