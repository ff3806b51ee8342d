//! Provider abstractions for the remote File Search Store
//!
//! This module provides a trait-based abstraction that allows switching between
//! the Gemini REST backend and an in-process store.

pub mod credentials;
pub mod gemini;
pub mod memory;
pub mod store;

pub use credentials::{ApiKeyCredentials, CredentialProvider};
pub use gemini::GeminiStoreClient;
pub use memory::{InMemoryStoreClient, Operation};
pub use store::{build_filter_expression, DocumentUpload, RemoteStoreClient};
