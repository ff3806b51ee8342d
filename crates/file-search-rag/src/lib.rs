//! file-search-rag: client-side orchestration for Gemini File Search Stores
//!
//! This crate manages one remote File Search Store per session: it creates the
//! store, uploads documents into it, keeps a local mirror of what was uploaded,
//! runs grounded searches that return answers with citations, tracks storage
//! usage against a tier, and deletes the store when the session ends.
//! Retrieval and ranking happen on the remote side.

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod generation;
pub mod providers;
pub mod search;
pub mod storage;
pub mod types;

pub use classifier::{classify, Classification};
pub use config::RagConfig;
pub use corpus::{CorpusOrchestrator, FileIntake, SessionPhase};
pub use error::{Error, ErrorKind, Result};
pub use generation::PromptSet;
pub use providers::{CredentialProvider, RemoteStoreClient};
pub use search::{QueryHistory, SearchService};
pub use storage::{StorageAccounting, StorageTier};
pub use types::{Citation, DocumentInfo, FileInfo, Metadata, SearchResult};
