//! Response types for grounded search

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Pointer from a generated answer back to a grounding document
///
/// Equality and hashing use only `(source_uri, title)`. Offsets are ignored,
/// so two citations of the same document collapse into one when merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Document resource URI (may be empty for synthesized citations)
    pub source_uri: String,
    /// Display label
    pub title: String,
    /// Character offset into the response text; `None` when unavailable
    pub start_index: Option<u32>,
    pub end_index: Option<u32>,
    /// Excerpt from the source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

impl Citation {
    /// Create a citation, deriving the title from the URI when none is given
    pub fn new(
        source_uri: impl Into<String>,
        title: Option<&str>,
        start_index: Option<u32>,
        end_index: Option<u32>,
    ) -> Self {
        let source_uri = source_uri.into();
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => label_from_uri(&source_uri),
        };
        Self {
            source_uri,
            title,
            start_index,
            end_index,
            excerpt: None,
        }
    }

    /// Attach an excerpt; blank text is dropped
    pub fn with_excerpt(mut self, excerpt: Option<String>) -> Self {
        self.excerpt = excerpt.filter(|e| !e.trim().is_empty());
        self
    }

    /// Citation with no URI and no offsets, attributed to a file name
    pub fn fallback(display_name: &str) -> Self {
        Self::new("", Some(display_name), None, None)
    }

    pub fn has_excerpt(&self) -> bool {
        self.excerpt.is_some()
    }

    /// `(chars 10-42)` when both offsets are known, otherwise empty
    pub fn offset_info(&self) -> String {
        match (self.start_index, self.end_index) {
            (Some(start), Some(end)) => format!("(chars {}-{})", start, end),
            _ => String::new(),
        }
    }
}

impl PartialEq for Citation {
    fn eq(&self, other: &Self) -> bool {
        self.source_uri == other.source_uri && self.title == other.title
    }
}

impl Eq for Citation {}

impl Hash for Citation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source_uri.hash(state);
        self.title.hash(state);
    }
}

impl std::fmt::Display for Citation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let offsets = self.offset_info();
        if offsets.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} {}", self.title, offsets)
        }
    }
}

/// Last path segment of a resource URI, or `Unknown`
fn label_from_uri(uri: &str) -> String {
    if uri.is_empty() {
        return "Unknown".to_string();
    }
    match uri.rsplit_once('/') {
        Some((_, last)) if !last.is_empty() => last.to_string(),
        _ => uri.to_string(),
    }
}

/// Append `incoming` to `citations`, skipping entries already present
pub fn merge_citations(citations: &mut Vec<Citation>, incoming: impl IntoIterator<Item = Citation>) {
    for citation in incoming {
        if !citations.contains(&citation) {
            citations.push(citation);
        }
    }
}

/// Result of one grounded search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    /// Generated answer text
    pub response: String,
    /// Display-ready markup; empty until a renderer fills it
    pub response_html: String,
    pub citations: Vec<Citation>,
    pub timestamp: DateTime<Local>,
}

impl SearchResult {
    pub fn new(query: impl Into<String>, response: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
            response_html: String::new(),
            citations,
            timestamp: Local::now(),
        }
    }

    /// Populate `response_html` with the given renderer
    pub fn render_with<F>(&mut self, render: F)
    where
        F: FnOnce(&str) -> String,
    {
        self.response_html = render(&self.response);
    }

    pub fn has_citations(&self) -> bool {
        !self.citations.is_empty()
    }

    /// Timestamp formatted like `Mar 4, 2025 2:07 PM`
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format("%b %-d, %Y %-I:%M %p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citation_dedup_ignores_offsets() {
        let a = Citation::new("fileSearchStores/s/documents/d1", Some("guide.pdf"), Some(0), Some(10));
        let b = Citation::new("fileSearchStores/s/documents/d1", Some("guide.pdf"), Some(50), Some(90));
        let c = Citation::new("fileSearchStores/s/documents/d2", Some("guide.pdf"), None, None);

        let mut merged = Vec::new();
        merge_citations(&mut merged, vec![a, b, c]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].start_index, Some(0));
    }

    #[test]
    fn test_title_falls_back_to_uri() {
        let c = Citation::new("fileSearchStores/s/documents/abc", None, None, None);
        assert_eq!(c.title, "abc");

        let c = Citation::new("fileSearchStores/s/documents/abc", Some("  "), None, None);
        assert_eq!(c.title, "abc");

        let c = Citation::new("", None, None, None);
        assert_eq!(c.title, "Unknown");

        let c = Citation::new("bare", None, None, None);
        assert_eq!(c.title, "bare");
    }

    #[test]
    fn test_fallback_citation() {
        let c = Citation::fallback("notes.md");
        assert_eq!(c.source_uri, "");
        assert_eq!(c.title, "notes.md");
        assert_eq!(c.start_index, None);
        assert_eq!(c.to_string(), "notes.md");
    }

    #[test]
    fn test_citation_display_with_offsets() {
        let c = Citation::new("u/doc", Some("Doc"), Some(3), Some(9));
        assert_eq!(c.offset_info(), "(chars 3-9)");
        assert_eq!(c.to_string(), "Doc (chars 3-9)");
    }

    #[test]
    fn test_excerpt_blank_dropped() {
        let c = Citation::fallback("a").with_excerpt(Some("   ".to_string()));
        assert!(!c.has_excerpt());
        let c = Citation::fallback("a").with_excerpt(Some("text".to_string()));
        assert!(c.has_excerpt());
    }

    #[test]
    fn test_render_with() {
        let mut result = SearchResult::new("q", "**bold**", vec![]);
        assert!(result.response_html.is_empty());
        result.render_with(|md| format!("<p>{}</p>", md));
        assert_eq!(result.response_html, "<p>**bold**</p>");
        assert!(!result.formatted_timestamp().is_empty());
    }
}
