//! Remote store provider trait for File Search Stores

use async_trait::async_trait;

use crate::error::Result;
use crate::generation::grounding::GenerateContentResponse;
use crate::types::{DocumentInfo, Metadata};

/// Document handed to [`RemoteStoreClient::import_document`]
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
    /// Tags attached at import time; empty means no metadata part
    pub metadata: Metadata,
}

impl DocumentUpload {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            mime_type: mime_type.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Declared size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Trait for a remote File Search Store
///
/// Implementations:
/// - `GeminiStoreClient`: Gemini REST API
/// - `InMemoryStoreClient`: in-process store for tests and offline runs
#[async_trait]
pub trait RemoteStoreClient: Send + Sync {
    /// Create a store, returning its resource name
    async fn create_store(&self, display_name: &str) -> Result<String>;

    /// Import one document into a store
    async fn import_document(&self, store_id: &str, upload: DocumentUpload) -> Result<DocumentInfo>;

    /// Full snapshot of the documents in a store
    async fn list_documents(&self, store_id: &str) -> Result<Vec<DocumentInfo>>;

    /// Delete one document
    async fn delete_document(&self, store_id: &str, document_id: &str) -> Result<()>;

    /// Delete a store and everything in it
    async fn delete_store(&self, store_id: &str) -> Result<()>;

    /// Grounded generation restricted to one store
    async fn search(
        &self,
        store_id: &str,
        query: &str,
        system_prompt: &str,
        filter: Option<&str>,
    ) -> Result<GenerateContentResponse>;

    /// Filter expression for a metadata map
    fn build_filter_expression(&self, metadata: &Metadata) -> String {
        build_filter_expression(metadata)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// `metadata.key="value"` clauses joined by ` AND `, in insertion order
pub fn build_filter_expression(metadata: &Metadata) -> String {
    metadata
        .iter()
        .map(|(key, value)| format!("metadata.{}=\"{}\"", key, escape_value(value)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '"' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
