//! Failure classification for remote store calls
//!
//! Maps HTTP statuses and free-form error text onto the closed [`ErrorKind`]
//! taxonomy. Classification is total: every input yields a kind.

use serde::Serialize;

use crate::error::{Error, ErrorKind};

/// Outcome of classifying a failure signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub kind: ErrorKind,
    pub user_message: &'static str,
}

impl From<ErrorKind> for Classification {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            user_message: kind.user_message(),
        }
    }
}

/// Classify a failure; the status code is authoritative when present
pub fn classify(status: Option<u16>, message: &str) -> Classification {
    match status {
        Some(code) => classify_status(code).into(),
        None => classify_message(message).into(),
    }
}

/// Map an HTTP status code to an error kind
pub fn classify_status(status: u16) -> ErrorKind {
    match status {
        401 | 403 => ErrorKind::Unauthenticated,
        404 => ErrorKind::NotFound,
        413 => ErrorKind::FileTooLarge,
        429 => ErrorKind::RateLimited,
        400 => ErrorKind::InvalidRequest,
        500..=599 => ErrorKind::RemoteError,
        _ => ErrorKind::Unknown,
    }
}

/// Keyword table, checked in order; first hit wins
const MESSAGE_RULES: &[(&[&str], ErrorKind)] = &[
    (&["unauthorized", "unauthenticated", "api key"], ErrorKind::Unauthenticated),
    (&["not found"], ErrorKind::NotFound),
    (&["resource_exhausted", "quota", "exceeded"], ErrorKind::QuotaExceeded),
    (&["too large", "size"], ErrorKind::FileTooLarge),
    (&["rate limit"], ErrorKind::RateLimited),
    (&["network", "connection", "timeout", "timed out"], ErrorKind::NetworkError),
    (&["invalid", "malformed"], ErrorKind::InvalidRequest),
    (&["server"], ErrorKind::RemoteError),
];

/// Best-effort classification from error text alone
///
/// Used when a failure never reached an HTTP layer, so only a wrapped
/// message is available.
pub fn classify_message(message: &str) -> ErrorKind {
    let lower = message.to_lowercase();
    MESSAGE_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, kind)| *kind)
        .unwrap_or(ErrorKind::Unknown)
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let kind = match status {
            Some(code) => classify_status(code),
            None if err.is_timeout() || err.is_connect() => ErrorKind::NetworkError,
            None if err.is_decode() => ErrorKind::RemoteError,
            None => classify_message(&err.to_string()),
        };
        Error::remote(kind, status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(classify_status(401), ErrorKind::Unauthenticated);
        assert_eq!(classify_status(403), ErrorKind::Unauthenticated);
        assert_eq!(classify_status(404), ErrorKind::NotFound);
        assert_eq!(classify_status(413), ErrorKind::FileTooLarge);
        assert_eq!(classify_status(429), ErrorKind::RateLimited);
        assert_eq!(classify_status(400), ErrorKind::InvalidRequest);
        assert_eq!(classify_status(500), ErrorKind::RemoteError);
        assert_eq!(classify_status(503), ErrorKind::RemoteError);
        assert_eq!(classify_status(599), ErrorKind::RemoteError);
        assert_eq!(classify_status(302), ErrorKind::Unknown);
        assert_eq!(classify_status(418), ErrorKind::Unknown);
    }

    #[test]
    fn test_rate_limited_status() {
        let c = classify(Some(429), "RESOURCE_EXHAUSTED: quota");
        assert_eq!(c.kind, ErrorKind::RateLimited);
        assert_eq!(
            c.user_message,
            "Too many requests. Please wait a moment and try again."
        );
    }

    #[test]
    fn test_message_mapping() {
        assert_eq!(classify_message("Connection timed out"), ErrorKind::NetworkError);
        assert_eq!(classify_message("Gemini API key not configured"), ErrorKind::Unauthenticated);
        assert_eq!(classify_message("401 Unauthorized"), ErrorKind::Unauthenticated);
        assert_eq!(classify_message("Document not found"), ErrorKind::NotFound);
        assert_eq!(classify_message("Quota exceeded for tier"), ErrorKind::QuotaExceeded);
        assert_eq!(classify_message("payload too large"), ErrorKind::FileTooLarge);
        assert_eq!(classify_message("Rate limit hit"), ErrorKind::RateLimited);
        assert_eq!(classify_message("network unreachable"), ErrorKind::NetworkError);
        assert_eq!(classify_message("Malformed filter"), ErrorKind::InvalidRequest);
        assert_eq!(classify_message("internal server error"), ErrorKind::RemoteError);
        assert_eq!(classify_message("something odd"), ErrorKind::Unknown);
        assert_eq!(classify_message(""), ErrorKind::Unknown);
    }

    #[test]
    fn test_status_overrides_message() {
        let c = classify(Some(404), "quota exceeded");
        assert_eq!(c.kind, ErrorKind::NotFound);

        let c = classify(None, "Connection timed out");
        assert_eq!(c.kind, ErrorKind::NetworkError);
        assert_eq!(c.user_message, ErrorKind::NetworkError.user_message());
    }
}
