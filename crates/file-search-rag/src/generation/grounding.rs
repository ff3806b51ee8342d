//! Wire types for grounded generation and response parsing
//!
//! Builds the `generateContent` request that scopes retrieval to a File
//! Search Store, and turns the response into a [`SearchResult`].

use serde::{Deserialize, Serialize};

use crate::types::{merge_citations, Citation, FileInfo, SearchResult};

/// Fixed sampling parameters for grounded answers
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_K: u32 = 40;
pub const TOP_P: f32 = 0.95;
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    /// Single-turn request restricted to one store, optionally filtered by metadata
    pub fn grounded(store_id: &str, query: &str, system_prompt: &str, filter: Option<&str>) -> Self {
        Self {
            system_instruction: Content::text(None, system_prompt),
            contents: vec![Content::text(Some("user"), query)],
            tools: vec![Tool {
                file_search: FileSearchTool {
                    store_uri: store_id.to_string(),
                    filter_spec: filter.filter(|f| !f.is_empty()).map(str::to_string),
                },
            }],
            generation_config: GenerationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub file_search: FileSearchTool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSearchTool {
    pub store_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_spec: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE,
            top_k: TOP_K,
            top_p: TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// `generateContent` response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateContentResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub content: Option<Content>,
    pub citation_metadata: Option<CitationMetadata>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CitationMetadata {
    pub citation_sources: Vec<CitationSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CitationSource {
    pub start_index: Option<u32>,
    pub end_index: Option<u32>,
    pub uri: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroundingMetadata {
    pub grounding_chunks: Vec<GroundingChunk>,
    pub grounding_supports: Vec<GroundingSupport>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroundingChunk {
    pub retrieved_context: Option<RetrievedContext>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrievedContext {
    pub uri: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroundingSupport {
    pub segment: Option<Segment>,
    pub grounding_chunk_indices: Vec<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Segment {
    pub start_index: Option<u32>,
    pub end_index: Option<u32>,
    pub text: Option<String>,
}

impl GenerateContentResponse {
    fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Concatenated text parts of the first candidate
    pub fn text(&self) -> String {
        self.first_candidate()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Citations from citation sources and grounding chunks, deduplicated
    pub fn citations(&self) -> Vec<Citation> {
        let mut citations = Vec::new();
        let Some(candidate) = self.first_candidate() else {
            return citations;
        };

        if let Some(meta) = &candidate.citation_metadata {
            let sources = meta.citation_sources.iter().filter_map(|source| {
                let uri = source.uri.as_deref().unwrap_or_default();
                let title = source.title.as_deref();
                if uri.is_empty() && title.map_or(true, |t| t.trim().is_empty()) {
                    return None;
                }
                Some(Citation::new(uri, title, source.start_index, source.end_index))
            });
            merge_citations(&mut citations, sources);
        }

        if let Some(grounding) = &candidate.grounding_metadata {
            let chunks = grounding
                .grounding_chunks
                .iter()
                .enumerate()
                .filter_map(|(index, chunk)| {
                    let ctx = chunk.retrieved_context.as_ref()?;
                    let uri = ctx.uri.as_deref().unwrap_or_default();
                    let title = ctx.title.as_deref();
                    if uri.is_empty() && title.map_or(true, |t| t.trim().is_empty()) {
                        return None;
                    }
                    let segment = grounding.segment_for_chunk(index);
                    Some(
                        Citation::new(
                            uri,
                            title,
                            segment.and_then(|s| s.start_index),
                            segment.and_then(|s| s.end_index),
                        )
                        .with_excerpt(ctx.text.clone()),
                    )
                });
            merge_citations(&mut citations, chunks);
        }

        citations
    }
}

impl GroundingMetadata {
    /// First answer segment supported by the chunk at `index`
    fn segment_for_chunk(&self, index: usize) -> Option<&Segment> {
        self.grounding_supports
            .iter()
            .find(|support| support.grounding_chunk_indices.contains(&index))
            .and_then(|support| support.segment.as_ref())
    }
}

/// Build a search result, attributing to every mirror entry when the
/// response carries no citations of its own
///
/// Fallback citations are one per mirror entry, so uploads sharing a display
/// name each get their own.
pub fn into_search_result(
    query: &str,
    response: &GenerateContentResponse,
    mirror: &[FileInfo],
) -> SearchResult {
    let mut citations = response.citations();
    if citations.is_empty() {
        citations.extend(mirror.iter().map(|file| Citation::fallback(&file.display_name)));
    }
    SearchResult::new(query, response.text(), citations)
}
