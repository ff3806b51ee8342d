//! Gemini REST binding for File Search Stores
//!
//! Every call authenticates with the API key as a `key` query parameter. Non-2xx
//! responses are classified by status; bodies that fail to decode surface as
//! `RemoteError`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use std::time::Duration;

use crate::classifier::classify_status;
use crate::config::GeminiConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::generation::grounding::{GenerateContentResponse, GenerateRequest};
use crate::types::DocumentInfo;

use super::credentials::CredentialProvider;
use super::store::{DocumentUpload, RemoteStoreClient};

const STORE_PREFIX: &str = "fileSearchStores/";

/// File Search Store client for the Gemini API
pub struct GeminiStoreClient {
    client: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
    base_url: String,
    upload_base_url: String,
    model: String,
    page_size: u32,
}

impl GeminiStoreClient {
    /// Create a client from config
    ///
    /// A request timeout is applied only when `request_timeout_secs` is set.
    pub fn new(config: &GeminiConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            credentials,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_base_url: config.upload_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            page_size: config.page_size.max(1),
        })
    }

    fn key(&self) -> Result<String> {
        self.credentials.credential()
    }

    fn store_url(&self, store_id: &str) -> String {
        format!("{}/{}", self.base_url, store_resource(store_id))
    }

    fn document_url(&self, store_id: &str, document_id: &str) -> String {
        format!("{}/{}", self.base_url, document_resource(store_id, document_id))
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// `fileSearchStores/{id}`, accepting either the bare id or the resource name
fn store_resource(store_id: &str) -> String {
    if store_id.starts_with(STORE_PREFIX) {
        store_id.to_string()
    } else {
        format!("{}{}", STORE_PREFIX, store_id)
    }
}

/// Full document resource name; document ids from listings are already qualified
fn document_resource(store_id: &str, document_id: &str) -> String {
    if document_id.starts_with(STORE_PREFIX) {
        document_id.to_string()
    } else {
        format!("{}/documents/{}", store_resource(store_id), document_id)
    }
}

/// Pass 2xx responses through; classify everything else by status
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let code = status.as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.to_string()
    } else {
        body
    };
    Err(Error::remote(classify_status(code), Some(code), message))
}

/// Decode a JSON body; undecodable bodies are a remote failure
async fn decode<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        Error::remote(
            ErrorKind::RemoteError,
            None,
            format!("Malformed response body: {}", e),
        )
    })
}

impl ImportResponse {
    /// The imported document, if the response names one
    ///
    /// A nested `document` wins. A top-level name is only accepted when it is
    /// a document resource; operation envelopes also carry a `name`.
    fn into_document(self) -> Option<DocumentResource> {
        match self.document {
            Some(doc) if !doc.name.is_empty() => Some(doc),
            _ if is_document_name(&self.top_level.name) => Some(self.top_level),
            _ => None,
        }
    }
}

fn is_document_name(name: &str) -> bool {
    name.contains("/documents/") && !name.contains("/operations/")
}

#[derive(Debug, Deserialize)]
struct StoreResource {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DocumentResource {
    name: String,
    display_name: Option<String>,
    mime_type: Option<String>,
    #[serde(deserialize_with = "size_from_string_or_number")]
    size_bytes: Option<u64>,
}

impl DocumentResource {
    fn into_info(self, fallback_name: &str, fallback_mime: &str, fallback_size: u64) -> DocumentInfo {
        DocumentInfo {
            resource_name: self.name,
            display_name: self
                .display_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| fallback_name.to_string()),
            mime_type: self
                .mime_type
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| fallback_mime.to_string()),
            size_bytes: self.size_bytes.unwrap_or(fallback_size),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImportResponse {
    document: Option<DocumentResource>,
    #[serde(flatten)]
    top_level: DocumentResource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListDocumentsResponse {
    documents: Vec<DocumentResource>,
    next_page_token: Option<String>,
}

/// int64 fields arrive as JSON strings; accept numbers too
fn size_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[async_trait]
impl RemoteStoreClient for GeminiStoreClient {
    async fn create_store(&self, display_name: &str) -> Result<String> {
        let key = self.key()?;
        let url = format!("{}/fileSearchStores", self.base_url);

        let response = self
            .client
            .post(&url)
            .query(&[("key", key.as_str())])
            .json(&serde_json::json!({ "displayName": display_name }))
            .send()
            .await?;
        let store: StoreResource = decode(ensure_success(response).await?).await?;

        if store.name.is_empty() {
            return Err(Error::remote(
                ErrorKind::RemoteError,
                None,
                "Store creation response has no name",
            ));
        }
        tracing::info!("File Search Store created: {}", store.name);
        Ok(store.name)
    }

    async fn import_document(&self, store_id: &str, upload: DocumentUpload) -> Result<DocumentInfo> {
        let key = self.key()?;
        let url = format!("{}/{}/documents", self.upload_base_url, store_resource(store_id));
        let size = upload.size();

        let file_part = Part::bytes(upload.bytes)
            .file_name(upload.filename.clone())
            .mime_str(&upload.mime_type)
            .map_err(|e| Error::invalid_input(format!("Invalid MIME type '{}': {}", upload.mime_type, e)))?;
        let mut form = Form::new().part("file", file_part);

        if !upload.metadata.is_empty() {
            let metadata_part = Part::text(serde_json::to_string(&upload.metadata)?)
                .mime_str("application/json")
                .map_err(|e| Error::invalid_input(format!("Invalid metadata part: {}", e)))?;
            form = form.part("metadata", metadata_part);
            tracing::debug!("Attaching {} metadata tags to {}", upload.metadata.len(), upload.filename);
        }

        let response = self
            .client
            .post(&url)
            .query(&[("key", key.as_str())])
            .multipart(form)
            .send()
            .await?;
        let imported: ImportResponse = decode(ensure_success(response).await?).await?;

        let resource = imported.into_document().ok_or_else(|| {
            Error::remote(
                ErrorKind::RemoteError,
                None,
                "Import response has no document name",
            )
        })?;

        let info = resource.into_info(&upload.filename, &upload.mime_type, size);
        tracing::info!(
            "Imported {} into {} as {}",
            upload.filename,
            store_id,
            info.resource_name
        );
        Ok(info)
    }

    async fn list_documents(&self, store_id: &str) -> Result<Vec<DocumentInfo>> {
        let key = self.key()?;
        let url = format!("{}/documents", self.store_url(store_id));
        let page_size = self.page_size.to_string();

        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![("key", key.as_str()), ("pageSize", page_size.as_str())];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let response = self.client.get(&url).query(&query).send().await?;
            let page: ListDocumentsResponse = decode(ensure_success(response).await?).await?;

            documents.extend(
                page.documents
                    .into_iter()
                    .filter(|doc| !doc.name.is_empty())
                    .map(|doc| doc.into_info("", "application/octet-stream", 0)),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::info!("Listed {} documents from {}", documents.len(), store_id);
        Ok(documents)
    }

    async fn delete_document(&self, store_id: &str, document_id: &str) -> Result<()> {
        let key = self.key()?;
        let url = self.document_url(store_id, document_id);

        let response = self
            .client
            .delete(&url)
            .query(&[("key", key.as_str()), ("force", "true")])
            .send()
            .await?;
        ensure_success(response).await?;

        tracing::info!("Deleted document {} from {}", document_id, store_id);
        Ok(())
    }

    async fn delete_store(&self, store_id: &str) -> Result<()> {
        let key = self.key()?;
        let url = self.store_url(store_id);

        let response = self
            .client
            .delete(&url)
            .query(&[("key", key.as_str()), ("force", "true")])
            .send()
            .await?;
        ensure_success(response).await?;

        tracing::info!("File Search Store deleted: {}", store_id);
        Ok(())
    }

    async fn search(
        &self,
        store_id: &str,
        query: &str,
        system_prompt: &str,
        filter: Option<&str>,
    ) -> Result<GenerateContentResponse> {
        let key = self.key()?;
        let request = GenerateRequest::grounded(&store_resource(store_id), query, system_prompt, filter);

        let response = self
            .client
            .post(&self.generate_url())
            .query(&[("key", key.as_str())])
            .json(&request)
            .send()
            .await?;
        let generated: GenerateContentResponse = decode(ensure_success(response).await?).await?;

        tracing::debug!(
            "Search on {} returned {} candidates",
            store_id,
            generated.candidates.len()
        );
        Ok(generated)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
