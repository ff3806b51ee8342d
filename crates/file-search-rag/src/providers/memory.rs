//! In-process File Search Store
//!
//! Keeps stores and documents in memory, records every call, and can be primed
//! to fail specific operations. Used by tests and for offline runs.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

use crate::error::{Error, ErrorKind, Result};
use crate::generation::grounding::{Candidate, Content, GenerateContentResponse};
use crate::types::DocumentInfo;

use super::store::{DocumentUpload, RemoteStoreClient};

/// Remote operation, used to prime failures and count calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateStore,
    ImportDocument,
    ListDocuments,
    DeleteDocument,
    DeleteStore,
    Search,
}

/// Failure to return from the next call of an operation
#[derive(Debug, Clone)]
struct PrimedFailure {
    kind: ErrorKind,
    status: Option<u16>,
    message: String,
}

#[derive(Debug, Clone)]
pub struct RecordedSearch {
    pub store_id: String,
    pub query: String,
    pub system_prompt: String,
    pub filter: Option<String>,
}

#[derive(Default)]
struct State {
    stores: HashMap<String, Vec<DocumentInfo>>,
    calls: Vec<Operation>,
    failures: HashMap<Operation, VecDeque<PrimedFailure>>,
    search_response: Option<GenerateContentResponse>,
    searches: Vec<RecordedSearch>,
    hide_listed_sizes: bool,
}

/// In-memory store client
#[derive(Default)]
pub struct InMemoryStoreClient {
    state: Mutex<State>,
}

impl InMemoryStoreClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail with the given classification
    pub fn fail_next(&self, op: Operation, kind: ErrorKind, status: Option<u16>, message: impl Into<String>) {
        self.state
            .lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(PrimedFailure {
                kind,
                status,
                message: message.into(),
            });
    }

    /// Response returned by `search`; defaults to an empty answer
    pub fn set_search_response(&self, response: GenerateContentResponse) {
        self.state.lock().search_response = Some(response);
    }

    /// Convenience for a plain-text answer with no citations
    pub fn set_search_text(&self, text: &str) {
        self.set_search_response(GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content::text(Some("model"), text)),
                ..Candidate::default()
            }],
        });
    }

    /// Report a size of 0 for listed documents, as a listing without
    /// `sizeBytes` does
    pub fn set_listed_sizes_hidden(&self, hidden: bool) {
        self.state.lock().hide_listed_sizes = hidden;
    }

    /// Total number of remote calls received
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Number of calls received for one operation
    pub fn calls_to(&self, op: Operation) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == op).count()
    }

    pub fn searches(&self) -> Vec<RecordedSearch> {
        self.state.lock().searches.clone()
    }

    /// Live stores
    pub fn store_count(&self) -> usize {
        self.state.lock().stores.len()
    }

    /// Add a document behind the client's back, as another session would
    pub fn insert_remote_document(&self, store_id: &str, display_name: &str, size_bytes: u64) -> Option<DocumentInfo> {
        let mut state = self.state.lock();
        let docs = state.stores.get_mut(store_id)?;
        let info = DocumentInfo {
            resource_name: format!("{}/documents/{}", store_id, Uuid::new_v4().simple()),
            display_name: display_name.to_string(),
            mime_type: "text/plain".to_string(),
            size_bytes,
        };
        docs.push(info.clone());
        Some(info)
    }

    /// Record the call and return any primed failure for it
    fn enter(&self, state: &mut State, op: Operation) -> Result<()> {
        state.calls.push(op);
        match state.failures.get_mut(&op).and_then(|queue| queue.pop_front()) {
            Some(failure) => Err(Error::remote(failure.kind, failure.status, failure.message)),
            None => Ok(()),
        }
    }
}

fn missing_store(store_id: &str) -> Error {
    Error::remote(
        ErrorKind::NotFound,
        Some(404),
        format!("Store not found: {}", store_id),
    )
}

#[async_trait]
impl RemoteStoreClient for InMemoryStoreClient {
    async fn create_store(&self, display_name: &str) -> Result<String> {
        let mut state = self.state.lock();
        self.enter(&mut state, Operation::CreateStore)?;
        let store_id = format!("fileSearchStores/{}", Uuid::new_v4().simple());
        state.stores.insert(store_id.clone(), Vec::new());
        tracing::debug!("In-memory store '{}' created: {}", display_name, store_id);
        Ok(store_id)
    }

    async fn import_document(&self, store_id: &str, upload: DocumentUpload) -> Result<DocumentInfo> {
        let mut state = self.state.lock();
        self.enter(&mut state, Operation::ImportDocument)?;
        let size_bytes = upload.size();
        let docs = state
            .stores
            .get_mut(store_id)
            .ok_or_else(|| missing_store(store_id))?;
        let info = DocumentInfo {
            resource_name: format!("{}/documents/{}", store_id, Uuid::new_v4().simple()),
            display_name: upload.filename,
            mime_type: upload.mime_type,
            size_bytes,
        };
        docs.push(info.clone());
        Ok(info)
    }

    async fn list_documents(&self, store_id: &str) -> Result<Vec<DocumentInfo>> {
        let mut state = self.state.lock();
        self.enter(&mut state, Operation::ListDocuments)?;
        let mut docs = state
            .stores
            .get(store_id)
            .cloned()
            .ok_or_else(|| missing_store(store_id))?;
        if state.hide_listed_sizes {
            docs.iter_mut().for_each(|d| d.size_bytes = 0);
        }
        Ok(docs)
    }

    async fn delete_document(&self, store_id: &str, document_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        self.enter(&mut state, Operation::DeleteDocument)?;
        let docs = state
            .stores
            .get_mut(store_id)
            .ok_or_else(|| missing_store(store_id))?;
        let before = docs.len();
        docs.retain(|d| d.resource_name != document_id);
        if docs.len() == before {
            return Err(Error::remote(
                ErrorKind::NotFound,
                Some(404),
                format!("Document not found: {}", document_id),
            ));
        }
        Ok(())
    }

    async fn delete_store(&self, store_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        self.enter(&mut state, Operation::DeleteStore)?;
        state
            .stores
            .remove(store_id)
            .map(|_| ())
            .ok_or_else(|| missing_store(store_id))
    }

    async fn search(
        &self,
        store_id: &str,
        query: &str,
        system_prompt: &str,
        filter: Option<&str>,
    ) -> Result<GenerateContentResponse> {
        let mut state = self.state.lock();
        self.enter(&mut state, Operation::Search)?;
        if !state.stores.contains_key(store_id) {
            return Err(missing_store(store_id));
        }
        state.searches.push(RecordedSearch {
            store_id: store_id.to_string(),
            query: query.to_string(),
            system_prompt: system_prompt.to_string(),
            filter: filter.map(str::to_string),
        });
        Ok(state.search_response.clone().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_lifecycle() {
        let client = InMemoryStoreClient::new();
        let store = client.create_store("test").await.unwrap();
        assert!(store.starts_with("fileSearchStores/"));

        let doc = client
            .import_document(&store, DocumentUpload::new(b"abc".to_vec(), "a.txt", "text/plain"))
            .await
            .unwrap();
        assert_eq!(doc.size_bytes, 3);
        assert_eq!(client.list_documents(&store).await.unwrap().len(), 1);

        client.delete_document(&store, &doc.resource_name).await.unwrap();
        assert!(client.list_documents(&store).await.unwrap().is_empty());

        client.delete_store(&store).await.unwrap();
        assert_eq!(client.store_count(), 0);
        assert_eq!(client.call_count(), 6);
    }

    #[tokio::test]
    async fn test_primed_failure_is_consumed_once() {
        let client = InMemoryStoreClient::new();
        client.fail_next(Operation::CreateStore, ErrorKind::RateLimited, Some(429), "slow down");

        let err = tokio_test::assert_err!(client.create_store("s").await);
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.status(), Some(429));
        tokio_test::assert_ok!(client.create_store("s").await);
        assert_eq!(client.calls_to(Operation::CreateStore), 2);
    }

    #[tokio::test]
    async fn test_search_records_request() {
        let client = InMemoryStoreClient::new();
        let store = client.create_store("s").await.unwrap();
        client.set_search_text("hello");

        let response = client
            .search(&store, "q", "prompt", Some("metadata.a=\"b\""))
            .await
            .unwrap();
        assert_eq!(response.text(), "hello");

        let searches = client.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].filter.as_deref(), Some("metadata.a=\"b\""));
    }

    #[tokio::test]
    async fn test_hidden_listed_sizes() {
        let client = InMemoryStoreClient::new();
        let store = client.create_store("s").await.unwrap();
        client
            .import_document(&store, DocumentUpload::new(b"abc".to_vec(), "a.txt", "text/plain"))
            .await
            .unwrap();
        client.set_listed_sizes_hidden(true);

        let docs = client.list_documents(&store).await.unwrap();
        assert_eq!(docs[0].size_bytes, 0);
    }

    #[tokio::test]
    async fn test_unknown_store() {
        let client = InMemoryStoreClient::new();
        let err = client.list_documents("fileSearchStores/missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
