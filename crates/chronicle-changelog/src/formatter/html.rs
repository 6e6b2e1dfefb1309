//! HTML changelog formatter

use super::ChangelogFormatter;
use crate::types::ChangelogEntry;

/// Renders an entry as an HTML fragment
#[derive(Debug, Clone, Default)]
pub struct HtmlFormatter;

impl ChangelogFormatter for HtmlFormatter {
    fn format(&self, entry: &ChangelogEntry) -> String {
        let mut output = String::from("<section class=\"changelog-entry\">\n");
        output.push_str(&format!(
            "  <h2>{} <time datetime=\"{date}\">{date}</time></h2>\n",
            escape(entry.label()),
            date = entry.date.format("%Y-%m-%d")
        ));

        for section in entry.sections.iter().filter(|s| !s.is_empty()) {
            output.push_str(&format!("  <h3>{}</h3>\n  <ul>\n", escape(&section.title)));
            for item in &section.items {
                output.push_str(&format!("    <li>{}</li>\n", escape(item)));
            }
            output.push_str("  </ul>\n");
        }

        output.push_str("</section>\n");
        output
    }

    fn name(&self) -> &'static str {
        "html"
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
