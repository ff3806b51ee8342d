//! Search front end: prompt selection, rendering and history

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use super::history::QueryHistory;
use crate::corpus::CorpusOrchestrator;
use crate::error::{Error, Result};
use crate::generation::markdown;
use crate::generation::PromptSet;
use crate::types::{Metadata, SearchResult};

/// Runs searches against an orchestrator and keeps the session history
pub struct SearchService {
    corpus: Arc<CorpusOrchestrator>,
    prompts: RwLock<PromptSet>,
    history: Mutex<QueryHistory>,
}

impl SearchService {
    pub fn new(corpus: Arc<CorpusOrchestrator>, prompts: PromptSet) -> Self {
        Self {
            corpus,
            prompts: RwLock::new(prompts),
            history: Mutex::new(QueryHistory::new()),
        }
    }

    /// Search with the active system prompt, render the answer and record it
    pub async fn search(&self, query: &str, metadata_filter: Option<&Metadata>) -> Result<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::invalid_input("Search query cannot be empty"));
        }

        let (system_prompt, prompt_index) = {
            let prompts = self.prompts.read();
            (prompts.active().to_string(), prompts.active_index())
        };

        let mut result = self.corpus.search(query, &system_prompt, metadata_filter).await?;
        result.render_with(markdown::to_html);
        self.history.lock().add(result.clone());

        tracing::info!(
            "Search completed for query: {} (prompt: {})",
            query.chars().take(50).collect::<String>(),
            prompt_index.map_or_else(|| "system".to_string(), |i| i.to_string())
        );
        Ok(result)
    }

    /// Past results, newest first
    pub fn history(&self) -> Vec<SearchResult> {
        self.history.lock().results().cloned().collect()
    }

    pub fn has_history(&self) -> bool {
        !self.history.lock().is_empty()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    pub fn select_prompt(&self, index: usize) -> Result<()> {
        self.prompts.write().select(index)
    }

    pub fn update_prompts(&self, system: impl Into<String>, architecture: Vec<String>) {
        self.prompts.write().update(system, architecture);
    }

    pub fn active_prompt(&self) -> String {
        self.prompts.read().active().to_string()
    }

    pub fn corpus(&self) -> &Arc<CorpusOrchestrator> {
        &self.corpus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::providers::{ApiKeyCredentials, InMemoryStoreClient};
    use crate::storage::StorageAccounting;

    async fn service() -> (Arc<InMemoryStoreClient>, SearchService) {
        let client = Arc::new(InMemoryStoreClient::new());
        let corpus = Arc::new(CorpusOrchestrator::new(
            client.clone(),
            Arc::new(ApiKeyCredentials::new(Some("key".to_string()))),
            "test",
            StorageAccounting::default(),
        ));
        corpus.init().await.unwrap();
        let prompts = PromptSet::new("base prompt", vec!["arch prompt".to_string()]);
        (client, SearchService::new(corpus, prompts))
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let (client, service) = service().await;
        let calls = client.call_count();
        let err = service.search("   ", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(client.call_count(), calls);
    }

    #[tokio::test]
    async fn test_search_renders_and_records() {
        let (client, service) = service().await;
        service
            .corpus()
            .upload_file(b"notes".to_vec(), "notes.md", "text/markdown", None)
            .await
            .unwrap();
        client.set_search_text("**Yes**");

        let result = service.search("first?", None).await.unwrap();
        assert!(result.response_html.contains("<strong>Yes</strong>"));
        assert_eq!(client.searches()[0].system_prompt, "arch prompt");

        service.search("second?", None).await.unwrap();
        let history = service.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].query, "second?");

        service.clear_history();
        assert!(!service.has_history());
    }

    #[tokio::test]
    async fn test_failed_search_not_recorded() {
        let (_client, service) = service().await;
        let err = service.search("question", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoDocuments);
        assert!(service.history().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_selection() {
        let (_client, service) = service().await;
        assert_eq!(service.active_prompt(), "arch prompt");
        assert!(service.select_prompt(3).is_err());
        service.update_prompts("new base", vec![]);
        assert_eq!(service.active_prompt(), "new base");
    }
}
