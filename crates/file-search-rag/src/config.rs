//! Configuration for the File Search RAG system

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::storage::StorageTier;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RagConfig {
    /// Gemini API configuration
    pub gemini: GeminiConfig,
    /// Storage tier and alerting
    pub storage: StorageConfig,
    /// Upload validation
    pub upload: UploadConfig,
    /// System prompts
    pub prompts: PromptConfig,
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let config = Self::from_toml(&raw)?;
                tracing::info!("Configuration loaded from {}", path.display());
                config
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::config(format!("Invalid config: {}", e)))
    }

    /// Override values from `GEMINI_API_KEY`, `GEMINI_MODEL` and `GEMINI_STORAGE_TIER`
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(key) = env_var("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = env_var("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(tier) = env_var("GEMINI_STORAGE_TIER") {
            self.storage.tier = tier.parse()?;
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key (usually supplied via `GEMINI_API_KEY`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// REST base URL
    pub base_url: String,
    /// Upload base URL for multipart document imports
    pub upload_base_url: String,
    /// Generation model used for grounded search
    pub model: String,
    /// Display name given to the per-session store
    pub store_display_name: String,
    /// Per-request timeout; `None` leaves deadlines to the caller
    pub request_timeout_secs: Option<u64>,
    /// Page size used when listing documents
    pub page_size: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            upload_base_url: "https://generativelanguage.googleapis.com/upload/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            store_display_name: "file-search-rag-session".to_string(),
            request_timeout_secs: None,
            page_size: 20,
        }
    }
}

/// Storage tier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Current plan
    pub tier: StorageTier,
    /// Log tier upgrade recommendations when the threshold is crossed
    pub auto_upgrade: bool,
    /// Usage percent at which an alert is logged
    pub alert_threshold_percent: u8,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tier: StorageTier::Free,
            auto_upgrade: true,
            alert_threshold_percent: 80,
        }
    }
}

/// Upload validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum size of a single file in bytes (default: 100MB)
    pub max_file_size: u64,
    /// Accepted extensions, lower-case with leading dot
    pub allowed_extensions: Vec<String>,
}

const DEFAULT_EXTENSIONS: &[&str] = &[
    // Documents
    ".pdf", ".doc", ".docx", ".odt", ".rtf",
    // Spreadsheets
    ".csv", ".xlsx", ".xls", ".ods",
    // Presentations
    ".pptx", ".ppt", ".odp",
    // Text
    ".txt", ".md", ".html", ".htm", ".xml", ".json", ".yaml", ".yml", ".toml",
    // Code
    ".py", ".js", ".ts", ".jsx", ".tsx", ".java", ".cpp", ".c", ".h", ".hpp",
    ".cs", ".go", ".rb", ".rs", ".php", ".swift", ".kt", ".scala", ".r", ".m",
    // Other
    ".log", ".sql", ".sh", ".bash", ".groovy", ".gradle",
];

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024,
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// System prompt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Base system prompt
    pub system: String,
    /// Alternative prompts the caller can switch between
    pub architecture: Vec<String>,
    /// Index into `architecture`; out of range selects `system`
    pub selected: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant. Answer using only the uploaded documents \
                     and say so when the documents do not contain the answer."
                .to_string(),
            architecture: Vec::new(),
            selected: 0,
        }
    }
}
