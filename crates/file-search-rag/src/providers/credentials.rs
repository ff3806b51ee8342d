//! API credential lookup

use crate::config::GeminiConfig;
use crate::error::{Error, ErrorKind, Result};

/// Source of the Gemini API credential
pub trait CredentialProvider: Send + Sync {
    /// Whether a usable credential is present
    fn has_credential(&self) -> bool;

    /// The credential, or `Unauthenticated` when absent
    fn credential(&self) -> Result<String>;
}

/// Static API key taken from configuration or `GEMINI_API_KEY`
#[derive(Clone, Default)]
pub struct ApiKeyCredentials {
    api_key: Option<String>,
}

impl ApiKeyCredentials {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Key from config, falling back to the environment
    pub fn from_config(config: &GeminiConfig) -> Self {
        let key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        Self::new(key)
    }
}

impl std::fmt::Debug for ApiKeyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CredentialProvider for ApiKeyCredentials {
    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn credential(&self) -> Result<String> {
        self.api_key.clone().ok_or_else(|| {
            Error::remote(ErrorKind::Unauthenticated, None, "Gemini API key not configured")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key() {
        let creds = ApiKeyCredentials::new(None);
        assert!(!creds.has_credential());
        assert_eq!(creds.credential().unwrap_err().kind(), ErrorKind::Unauthenticated);

        let creds = ApiKeyCredentials::new(Some("   ".to_string()));
        assert!(!creds.has_credential());
    }

    #[test]
    fn test_key_present_and_redacted() {
        let creds = ApiKeyCredentials::new(Some("secret-key".to_string()));
        assert!(creds.has_credential());
        assert_eq!(creds.credential().unwrap(), "secret-key");
        assert!(!format!("{:?}", creds).contains("secret-key"));
    }

    #[test]
    fn test_config_key_wins() {
        let config = GeminiConfig {
            api_key: Some("from-config".to_string()),
            ..GeminiConfig::default()
        };
        let creds = ApiKeyCredentials::from_config(&config);
        assert_eq!(creds.credential().unwrap(), "from-config");
    }
}
