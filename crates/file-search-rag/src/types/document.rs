//! Document types for the remote store and the local mirror

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::storage::format_bytes;

/// Document as reported by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Resource name, e.g. `fileSearchStores/abc/documents/xyz`
    pub resource_name: String,
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// Mirror entry for one uploaded file
///
/// `local_id` is generated client-side and never sent to the remote store.
/// It is regenerated on every mirror refresh, so callers must not hold it
/// across a `list_files` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Client-side handle
    pub local_id: String,
    /// Remote resource name, used for deletion
    pub document_id: String,
    pub display_name: String,
    pub mime_type: String,
    /// Declared size; trusted as-is for accounting
    pub size_bytes: u64,
}

impl FileInfo {
    /// Build a mirror entry with a fresh local id
    pub fn from_document(doc: DocumentInfo) -> Self {
        Self {
            local_id: Uuid::new_v4().to_string(),
            document_id: doc.resource_name,
            display_name: doc.display_name,
            mime_type: doc.mime_type,
            size_bytes: doc.size_bytes,
        }
    }

    /// Human-readable size, e.g. `1.5 MB`
    pub fn display_size(&self) -> String {
        format_bytes(self.size_bytes)
    }
}

/// Key-value tags attached to a document
///
/// Keys are unique and iteration follows insertion order, which keeps
/// filter expressions stable for a given map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tag; a replaced key keeps its original position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a `key=value` pair, trimming whitespace around both sides
    pub fn parse_pair(raw: &str) -> Option<(String, String)> {
        let (key, value) = raw.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), value.trim().to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for (k, v) in iter {
            metadata.insert(k, v);
        }
        metadata
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_keeps_insertion_order() {
        let mut metadata = Metadata::new();
        metadata.insert("project", "apollo");
        metadata.insert("version", "1.0");
        metadata.insert("department", "eng");
        let keys: Vec<_> = metadata.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["project", "version", "department"]);
    }

    #[test]
    fn test_metadata_replace_keeps_position() {
        let mut metadata: Metadata = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(metadata.insert("a", "3"), Some("1".to_string()));
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.iter().next(), Some(("a", "3")));
    }

    #[test]
    fn test_metadata_serializes_as_object() {
        let metadata: Metadata = [("project", "x")].into_iter().collect();
        assert_eq!(serde_json::to_string(&metadata).unwrap(), r#"{"project":"x"}"#);
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            Metadata::parse_pair(" team = search "),
            Some(("team".to_string(), "search".to_string()))
        );
        assert_eq!(Metadata::parse_pair("no-equals"), None);
        assert_eq!(Metadata::parse_pair("=value"), None);
    }

    #[test]
    fn test_file_info_from_document() {
        let doc = DocumentInfo {
            resource_name: "fileSearchStores/s/documents/d".to_string(),
            display_name: "design.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size_bytes: 1536,
        };
        let a = FileInfo::from_document(doc.clone());
        let b = FileInfo::from_document(doc);
        assert_eq!(a.document_id, "fileSearchStores/s/documents/d");
        assert_ne!(a.local_id, b.local_id);
        assert_eq!(a.display_size(), "1.5 KB");
    }
}
