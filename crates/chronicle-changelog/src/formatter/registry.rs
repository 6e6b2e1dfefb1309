//! Formatter registry

use std::sync::Arc;

use super::{ChangelogFormatter, HtmlFormatter, JsonFormatter, MarkdownFormatter};

/// Registry of available changelog formatters
pub struct FormatterRegistry {
    formatters: Vec<Arc<dyn ChangelogFormatter>>,
}

impl FormatterRegistry {
    /// Create a new registry with all built-in formatters
    pub fn new() -> Self {
        Self {
            formatters: vec![
                Arc::new(MarkdownFormatter::new()),
                Arc::new(JsonFormatter),
                Arc::new(HtmlFormatter),
            ],
        }
    }

    /// Get formatter by its configuration name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ChangelogFormatter>> {
        self.formatters.iter().find(|f| f.name() == name).cloned()
    }

    /// Names of all registered formatters
    pub fn names(&self) -> Vec<&'static str> {
        self.formatters.iter().map(|f| f.name()).collect()
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::config::VALID_FORMATS;

    #[test]
    fn test_registry_covers_valid_formats() {
        let registry = FormatterRegistry::new();
        assert_eq!(registry.names(), VALID_FORMATS.to_vec());
        assert_eq!(registry.get("html").unwrap().extension(), "html");
        assert!(registry.get("pdf").is_none());
    }
}
