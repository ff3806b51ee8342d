//! Error types for the File Search RAG system

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for File Search operations
pub type Result<T> = std::result::Result<T, Error>;

/// Closed set of failure categories surfaced to callers
///
/// Every [`Error`] maps onto exactly one kind, and every kind carries exactly
/// one user-facing sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No live store for this session
    NotInitialized,
    /// Missing or rejected credential
    Unauthenticated,
    /// Store or document does not exist
    NotFound,
    /// File exceeds the upload limit
    FileTooLarge,
    /// Storage quota exhausted
    QuotaExceeded,
    /// Too many requests
    RateLimited,
    /// Transport-level failure before an HTTP response
    NetworkError,
    /// Request rejected as invalid
    InvalidRequest,
    /// Catch-all for remote failures (5xx, undecodable bodies)
    RemoteError,
    /// Search attempted with no uploaded documents
    NoDocuments,
    /// Anything else
    Unknown,
}

impl ErrorKind {
    /// All kinds, in declaration order
    pub const ALL: [ErrorKind; 11] = [
        ErrorKind::NotInitialized,
        ErrorKind::Unauthenticated,
        ErrorKind::NotFound,
        ErrorKind::FileTooLarge,
        ErrorKind::QuotaExceeded,
        ErrorKind::RateLimited,
        ErrorKind::NetworkError,
        ErrorKind::InvalidRequest,
        ErrorKind::RemoteError,
        ErrorKind::NoDocuments,
        ErrorKind::Unknown,
    ];

    /// Fixed user-facing sentence with a recovery suggestion
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::NotInitialized => {
                "File Search Store is not initialized. Please check your API key and restart the application."
            }
            ErrorKind::Unauthenticated => {
                "Authentication failed. Please check your Gemini API key is configured correctly."
            }
            ErrorKind::NotFound => {
                "The requested document or store was not found. It may have been deleted."
            }
            ErrorKind::FileTooLarge => {
                "File size exceeds the 100 MB limit. Please upload a smaller file."
            }
            ErrorKind::QuotaExceeded => {
                "Storage quota exceeded. Please delete some files or upgrade to a higher storage tier."
            }
            ErrorKind::RateLimited => "Too many requests. Please wait a moment and try again.",
            ErrorKind::NetworkError => {
                "Network error connecting to Gemini API. Please check your internet connection."
            }
            ErrorKind::InvalidRequest => "Invalid request. Please check your input and try again.",
            ErrorKind::RemoteError => "Gemini API server error. Please try again later.",
            ErrorKind::NoDocuments => "No files uploaded. Please upload files before searching.",
            ErrorKind::Unknown => "An unexpected error occurred. Please try again.",
        }
    }

    /// Stable snake_case identifier, used in logs and JSON payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotInitialized => "not_initialized",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::NotFound => "not_found",
            ErrorKind::FileTooLarge => "file_too_large",
            ErrorKind::QuotaExceeded => "quota_exceeded",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::RemoteError => "remote_error",
            ErrorKind::NoDocuments => "no_documents",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File Search system errors
#[derive(Debug, Error)]
pub enum Error {
    /// No live store (startup failed, or the session was closed)
    #[error("File Search Store is not initialized")]
    NotInitialized,

    /// Search attempted against an empty mirror
    #[error("No files uploaded. Please upload files before searching.")]
    NoDocuments,

    /// Classified failure from the remote store API
    #[error("Gemini API error ({kind}{}): {message}", .status.map(|s| format!(", HTTP {}", s)).unwrap_or_default())]
    Remote {
        kind: ErrorKind,
        status: Option<u16>,
        message: String,
    },

    /// File rejected before upload because of its size
    #[error("File '{filename}' is too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Empty or malformed caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a classified remote error
    pub fn remote(kind: ErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            kind,
            status,
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Taxonomy kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotInitialized => ErrorKind::NotInitialized,
            Error::NoDocuments => ErrorKind::NoDocuments,
            Error::Remote { kind, .. } => *kind,
            Error::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Error::UnsupportedFileType(_) | Error::InvalidInput(_) => ErrorKind::InvalidRequest,
            // Undecodable payloads count as a misbehaving remote
            Error::Json(_) => ErrorKind::RemoteError,
            Error::Config(_) | Error::Io(_) => ErrorKind::Unknown,
        }
    }

    /// Fixed user-facing sentence for this error's kind
    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }

    /// HTTP status attached to a remote error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_distinct_sentence() {
        let mut seen = std::collections::HashSet::new();
        for kind in ErrorKind::ALL {
            assert!(!kind.user_message().is_empty());
            assert!(seen.insert(kind.user_message()), "duplicate sentence for {kind}");
        }
    }

    #[test]
    fn quota_sentence_matches_guidance() {
        assert_eq!(
            ErrorKind::QuotaExceeded.user_message(),
            "Storage quota exceeded. Please delete some files or upgrade to a higher storage tier."
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::NotInitialized.kind(), ErrorKind::NotInitialized);
        assert_eq!(Error::NoDocuments.kind(), ErrorKind::NoDocuments);
        assert_eq!(
            Error::UnsupportedFileType(".exe".into()).kind(),
            ErrorKind::InvalidRequest
        );
        let err = Error::remote(ErrorKind::RateLimited, Some(429), "slow down");
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.to_string(), "Gemini API error (rate_limited, HTTP 429): slow down");
    }

    #[test]
    fn remote_display_without_status() {
        let err = Error::remote(ErrorKind::NetworkError, None, "connection reset");
        assert_eq!(err.to_string(), "Gemini API error (network_error): connection reset");
    }
}
