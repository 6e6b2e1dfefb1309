//! YAML front matter between `---` fences

use super::types::FrontMatter;

const FENCE: &str = "---";

/// Split content into its front matter block and body.
///
/// Content without an opening fence has no front matter; an opening fence
/// without a closing one is an error.
fn split(content: &str) -> Result<Option<(&str, &str)>, String> {
    let Some(first_line_end) = content.find('\n') else {
        return Ok(None);
    };
    if content[..first_line_end].trim_end() != FENCE {
        return Ok(None);
    }

    let rest = &content[first_line_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            return Ok(Some((&rest[..offset], &rest[offset + line.len()..])));
        }
        offset += line.len();
    }

    Err("front matter is not closed".to_string())
}

/// Parse front matter and return it with the body
pub fn parse(content: &str) -> Result<(FrontMatter, &str), String> {
    match split(content)? {
        None => Ok((FrontMatter::default(), content)),
        Some((yaml, body)) if yaml.trim().is_empty() => Ok((FrontMatter::default(), body)),
        Some((yaml, body)) => serde_yaml::from_str::<FrontMatter>(yaml)
            .map(|matter| (matter, body))
            .map_err(|e| format!("invalid front matter: {}", e)),
    }
}

/// Serialize front matter and body into file content
pub fn render(matter: &FrontMatter, body: &str) -> String {
    // FrontMatter holds only scalar fields, which always serialize
    let yaml = serde_yaml::to_string(matter).unwrap_or_default();
    format!("{FENCE}\n{yaml}{FENCE}\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_front_matter() {
        let content = "---\ncategory: fixed\nauthor: Ada\nbreaking: true\n---\n# Fix crash\n\nDetails\n";
        let (matter, body) = parse(content).unwrap();
        assert_eq!(matter.category.as_deref(), Some("fixed"));
        assert_eq!(matter.author.as_deref(), Some("Ada"));
        assert_eq!(matter.breaking, Some(true));
        assert_eq!(body, "# Fix crash\n\nDetails\n");
    }

    #[test]
    fn test_no_front_matter() {
        let (matter, body) = parse("# Just a heading\n").unwrap();
        assert_eq!(matter, FrontMatter::default());
        assert_eq!(body, "# Just a heading\n");
    }

    #[test]
    fn test_empty_front_matter() {
        let (matter, body) = parse("---\n---\n# Title\n").unwrap();
        assert_eq!(matter.category, None);
        assert_eq!(body, "# Title\n");
    }

    #[test]
    fn test_unclosed_and_invalid_front_matter() {
        assert!(parse("---\ncategory: fixed\n# Title\n").is_err());
        assert!(parse("---\ncategory: [unclosed\n---\n# Title\n").is_err());
    }

    #[test]
    fn test_render() {
        let matter = FrontMatter {
            category: Some("added".to_string()),
            breaking: Some(false),
            ..FrontMatter::default()
        };
        let content = render(&matter, "# Title\n\n");
        assert!(content.starts_with("---\ncategory: added\n"));
        assert!(content.ends_with("---\n# Title\n\n"));
        assert_eq!(parse(&content).unwrap().0, matter);
    }
}
