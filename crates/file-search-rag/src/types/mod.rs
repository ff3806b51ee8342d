//! Core types for the File Search RAG system

pub mod document;
pub mod response;

pub use document::{DocumentInfo, FileInfo, Metadata};
pub use response::{merge_citations, Citation, SearchResult};
