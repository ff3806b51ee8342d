//! Upload validation and MIME detection

use chrono::Local;

use crate::config::UploadConfig;
use crate::error::{Error, Result};

/// Validated upload ready for [`CorpusOrchestrator::upload_file`](super::CorpusOrchestrator::upload_file)
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

impl PreparedUpload {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Validates files before they reach the remote store
#[derive(Debug, Clone)]
pub struct FileIntake {
    max_file_size: u64,
    allowed_extensions: Vec<String>,
}

impl FileIntake {
    pub fn new(max_file_size: u64, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| normalize_extension(&e))
                .collect(),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.max_file_size, config.allowed_extensions.clone())
    }

    /// Check name, size and extension
    pub fn validate(&self, filename: &str, size: u64) -> Result<()> {
        if filename.trim().is_empty() {
            return Err(Error::invalid_input("File name is required"));
        }
        if size == 0 {
            return Err(Error::invalid_input(format!("File is empty: {}", filename)));
        }
        if size > self.max_file_size {
            return Err(Error::FileTooLarge {
                filename: filename.to_string(),
                size,
                limit: self.max_file_size,
            });
        }

        let extension = extension_of(filename);
        if !self.allowed_extensions.contains(&extension) {
            let shown = if extension.is_empty() { "(none)" } else { extension.as_str() };
            return Err(Error::UnsupportedFileType(format!("{} ({})", shown, filename)));
        }

        tracing::debug!("File validated: {}", filename);
        Ok(())
    }

    /// Validate and attach a MIME type
    pub fn prepare(&self, bytes: Vec<u8>, filename: &str) -> Result<PreparedUpload> {
        self.validate(filename, bytes.len() as u64)?;
        Ok(PreparedUpload {
            bytes,
            filename: filename.to_string(),
            mime_type: mime_for(filename),
        })
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }
}

impl Default for FileIntake {
    fn default() -> Self {
        Self::from_config(&UploadConfig::default())
    }
}

/// Lower-case extension with leading dot, or empty
fn extension_of(filename: &str) -> String {
    match filename.rfind('.') {
        Some(index) => filename[index..].to_lowercase(),
        None => String::new(),
    }
}

fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().to_lowercase();
    if trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    }
}

/// MIME type guessed from the file name, `application/octet-stream` when unknown
pub fn mime_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Pasted text as a `.txt` upload named `project-summary-<timestamp>.txt`
pub fn text_upload(text: &str) -> Result<PreparedUpload> {
    if text.trim().is_empty() {
        return Err(Error::invalid_input("Text content cannot be empty"));
    }
    let filename = format!("project-summary-{}.txt", Local::now().format("%Y%m%d-%H%M%S"));
    Ok(PreparedUpload {
        bytes: text.as_bytes().to_vec(),
        filename,
        mime_type: "text/plain".to_string(),
    })
}
