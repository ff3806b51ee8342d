//! Session-scoped orchestration of one File Search Store
//!
//! A [`CorpusOrchestrator`] owns exactly one remote store for its lifetime,
//! a local mirror of the documents uploaded to it, and the storage accounting
//! for that mirror. All state sits behind one async mutex that is held across
//! the remote call of every operation, so operations on a session never
//! interleave.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::grounding::into_search_result;
use crate::providers::{CredentialProvider, DocumentUpload, RemoteStoreClient};
use crate::storage::{StorageAccounting, StorageTier};
use crate::types::{DocumentInfo, FileInfo, Metadata, SearchResult};

/// Lifecycle of the session's remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No store yet, or store creation failed (degraded mode)
    Uninitialized,
    /// Store created and usable
    StoreActive,
    /// Store deleted; the session cannot be reused
    Closed,
}

struct Session {
    phase: SessionPhase,
    store_id: Option<String>,
    mirror: Vec<FileInfo>,
    accounting: StorageAccounting,
}

impl Session {
    /// Store id when active, `NotInitialized` otherwise
    fn active_store(&self) -> Result<String> {
        match (&self.phase, &self.store_id) {
            (SessionPhase::StoreActive, Some(id)) => Ok(id.clone()),
            _ => Err(Error::NotInitialized),
        }
    }

    /// Like `active_store`, logging the refusal for `operation`
    fn require_active(&self, operation: &str) -> Result<String> {
        self.active_store().map_err(|err| {
            log_failure(operation, &err);
            err
        })
    }

    /// Replace the mirror with a remote listing
    ///
    /// Documents already mirrored keep their declared size; only documents
    /// first seen in this listing take the size the remote store reports.
    fn refresh_mirror(&mut self, documents: Vec<DocumentInfo>) {
        let mirror = documents
            .into_iter()
            .map(|document| {
                let known_size = self
                    .mirror
                    .iter()
                    .find(|f| f.document_id == document.resource_name)
                    .map(|f| f.size_bytes);
                let mut file = FileInfo::from_document(document);
                if let Some(size) = known_size {
                    file.size_bytes = size;
                }
                file
            })
            .collect();
        self.mirror = mirror;
    }
}

/// Log a classified failure before it is surfaced or absorbed
fn log_failure(operation: &str, err: &Error) {
    tracing::error!(
        "{} failed [{}]: {} ({})",
        operation,
        err.kind(),
        err,
        err.user_message()
    );
}

/// Orchestrates one File Search Store session
pub struct CorpusOrchestrator {
    client: Arc<dyn RemoteStoreClient>,
    credentials: Arc<dyn CredentialProvider>,
    store_display_name: String,
    session: Mutex<Session>,
}

impl CorpusOrchestrator {
    /// Create an uninitialized session
    pub fn new(
        client: Arc<dyn RemoteStoreClient>,
        credentials: Arc<dyn CredentialProvider>,
        store_display_name: impl Into<String>,
        accounting: StorageAccounting,
    ) -> Self {
        Self {
            client,
            credentials,
            store_display_name: store_display_name.into(),
            session: Mutex::new(Session {
                phase: SessionPhase::Uninitialized,
                store_id: None,
                mirror: Vec::new(),
                accounting,
            }),
        }
    }

    /// Create an uninitialized session from config
    pub fn from_config(
        config: &RagConfig,
        client: Arc<dyn RemoteStoreClient>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self::new(
            client,
            credentials,
            config.gemini.store_display_name.clone(),
            StorageAccounting::from_config(&config.storage),
        )
    }

    /// Create the session's store
    ///
    /// Without a credential no remote call is made. A failure leaves the
    /// session uninitialized; callers may ignore the error and run degraded.
    /// Calling this on an active session does nothing. A closed session
    /// cannot be re-initialized.
    pub async fn init(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        match session.phase {
            SessionPhase::StoreActive => return Ok(()),
            SessionPhase::Closed => {
                let err = Error::NotInitialized;
                log_failure("Store initialization", &err);
                return Err(err);
            }
            SessionPhase::Uninitialized => {}
        }

        if !self.credentials.has_credential() {
            let err = match self.credentials.credential() {
                Err(err) => err,
                Ok(_) => Error::NotInitialized,
            };
            tracing::warn!("GEMINI_API_KEY not configured. File operations will not work.");
            log_failure("Store initialization", &err);
            return Err(err);
        }

        match self.client.create_store(&self.store_display_name).await {
            Ok(store_id) => {
                tracing::info!(
                    "File Search Store initialized via {}: {}",
                    self.client.name(),
                    store_id
                );
                session.store_id = Some(store_id);
                session.phase = SessionPhase::StoreActive;
                session.mirror.clear();
                Ok(())
            }
            Err(err) => {
                log_failure("Store initialization", &err);
                Err(err)
            }
        }
    }

    /// Upload one document and record it in the mirror
    ///
    /// The declared size is the byte length of `bytes`; going over the tier
    /// capacity only logs a warning.
    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
        metadata: Option<Metadata>,
    ) -> Result<FileInfo> {
        let mut session = self.session.lock().await;
        let store_id = session.require_active(&format!("Upload of {}", filename))?;

        let mut upload = DocumentUpload::new(bytes, filename, mime_type);
        if let Some(metadata) = metadata {
            upload = upload.with_metadata(metadata);
        }
        let declared_size = upload.size();

        let document = match self.client.import_document(&store_id, upload).await {
            Ok(document) => document,
            Err(err) => {
                log_failure(&format!("Upload of {}", filename), &err);
                return Err(err);
            }
        };

        let mut file = FileInfo::from_document(document);
        file.size_bytes = declared_size;
        session.mirror.push(file.clone());
        session.accounting.add(declared_size);

        tracing::info!(
            "File uploaded: {} ({}) -> {}",
            file.display_name,
            file.display_size(),
            file.document_id
        );
        Ok(file)
    }

    /// Delete a mirrored document
    ///
    /// Unknown ids succeed without touching anything. For known ids the
    /// mirror entry and its accounted size are removed even if the remote
    /// delete fails.
    pub async fn delete_file(&self, local_id: &str) -> Result<()> {
        let mut session = self.session.lock().await;
        let store_id = session.require_active("Delete")?;

        let Some(position) = session.mirror.iter().position(|f| f.local_id == local_id) else {
            tracing::warn!("Delete requested for unknown file id: {}", local_id);
            return Ok(());
        };
        let document_id = session.mirror[position].document_id.clone();

        if let Err(err) = self.client.delete_document(&store_id, &document_id).await {
            log_failure(&format!("Delete of {}", document_id), &err);
        }

        let file = session.mirror.remove(position);
        session.accounting.remove(file.size_bytes);
        tracing::info!("File removed: {} ({})", file.display_name, local_id);
        Ok(())
    }

    /// Current documents, refreshed from the remote store when active
    ///
    /// Never fails. A refresh replaces the mirror wholesale and assigns new
    /// local ids, keeping the declared size of documents uploaded in this
    /// session. On a remote failure the last known mirror is returned.
    pub async fn list_files(&self) -> Vec<FileInfo> {
        let mut session = self.session.lock().await;
        let Ok(store_id) = session.active_store() else {
            return session.mirror.clone();
        };

        match self.client.list_documents(&store_id).await {
            Ok(documents) => {
                session.refresh_mirror(documents);
                tracing::debug!("Mirror refreshed: {} files", session.mirror.len());
            }
            Err(err) => log_failure("Document listing", &err),
        }
        session.mirror.clone()
    }

    /// Mirror snapshot without a remote refresh
    pub async fn files(&self) -> Vec<FileInfo> {
        self.session.lock().await.mirror.clone()
    }

    /// Grounded search over the session's documents
    ///
    /// Fails with `NoDocuments` before any network call when nothing has been
    /// uploaded. A non-empty `metadata_filter` restricts retrieval to
    /// documents carrying every given tag.
    pub async fn search(
        &self,
        query: &str,
        system_prompt: &str,
        metadata_filter: Option<&Metadata>,
    ) -> Result<SearchResult> {
        let session = self.session.lock().await;
        let store_id = session.require_active("Search")?;
        if session.mirror.is_empty() {
            let err = Error::NoDocuments;
            log_failure("Search", &err);
            return Err(err);
        }

        let filter = metadata_filter
            .filter(|m| !m.is_empty())
            .map(|m| self.client.build_filter_expression(m));

        let response = match self
            .client
            .search(&store_id, query, system_prompt, filter.as_deref())
            .await
        {
            Ok(response) => response,
            Err(err) => {
                log_failure("Search", &err);
                return Err(err);
            }
        };

        let result = into_search_result(query, &response, &session.mirror);
        tracing::info!(
            "Search completed with {} citations{}",
            result.citations.len(),
            filter
                .as_deref()
                .map(|f| format!(" (filter: {})", f))
                .unwrap_or_default()
        );
        Ok(result)
    }

    /// Delete the session's store
    ///
    /// Idempotent. A failed remote delete is logged and the session still
    /// ends closed. From the uninitialized state this does nothing.
    pub async fn close(&self) {
        let mut session = self.session.lock().await;
        if session.phase != SessionPhase::StoreActive {
            return;
        }

        if let Some(store_id) = session.store_id.take() {
            match self.client.delete_store(&store_id).await {
                Ok(()) => tracing::info!("File Search Store cleaned up: {}", store_id),
                Err(err) => log_failure(&format!("Cleanup of {}", store_id), &err),
            }
        }
        session.phase = SessionPhase::Closed;
    }

    pub async fn phase(&self) -> SessionPhase {
        self.session.lock().await.phase
    }

    pub async fn is_active(&self) -> bool {
        self.phase().await == SessionPhase::StoreActive
    }

    pub async fn store_id(&self) -> Option<String> {
        self.session.lock().await.store_id.clone()
    }

    pub async fn usage_percent(&self) -> f64 {
        self.session.lock().await.accounting.usage_percent()
    }

    pub async fn remaining_bytes(&self) -> u64 {
        self.session.lock().await.accounting.remaining_bytes()
    }

    pub async fn usage_bytes(&self) -> u64 {
        self.session.lock().await.accounting.usage_bytes()
    }

    pub async fn status_line(&self) -> String {
        self.session.lock().await.accounting.status_line()
    }

    pub async fn current_tier(&self) -> StorageTier {
        self.session.lock().await.accounting.tier()
    }

    pub async fn set_tier(&self, tier: StorageTier) {
        self.session.lock().await.accounting.set_tier(tier);
    }
}
