//! Markdown rendering for answers

use pulldown_cmark::{html, Options, Parser};

/// Render markdown to HTML; empty input yields an empty string
pub fn to_html(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markdown() {
        let out = to_html("# Title\n\nSome **bold** text.");
        assert!(out.contains("<h1>Title</h1>"));
        assert!(out.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_list_and_table() {
        let out = to_html("- a\n- b\n\n| x | y |\n|---|---|\n| 1 | 2 |\n");
        assert!(out.contains("<li>a</li>"));
        assert!(out.contains("<table>"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(to_html(""), "");
        assert_eq!(to_html("   \n"), "");
    }
}
