//! File-backed persistence of the POS [`Document`].
//!
//! The whole document lives in one UTF-8 JSON file. It is read in full on
//! every load and replaced in full on every save; nothing is cached between
//! requests.
//!
//! # Format
//!
//! Pretty-printed with a 4-space indent and a trailing newline. Non-ASCII
//! text (Thai product names, currency symbols) is written literally.
//!
//! # Writes
//!
//! Saves go to a uniquely named temp file beside the target, are synced, and
//! are then renamed over the target. A reader racing a writer sees either the
//! old or the new document. Concurrent writers are last-writer-wins.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use startosphere_core::{Document, json_kind};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const INDENT: &[u8] = b"    ";

/// Errors returned by [`DataStore::save`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The payload is not a JSON object. Nothing was written.
    #[error("document must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// The payload could not be serialized.
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing or renaming the file failed.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Owner of the on-disk document.
#[derive(Debug, Clone)]
pub struct DataStore {
    path: PathBuf,
}

impl DataStore {
    /// Create a store for the document at `path`. The file does not need to exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored document.
    ///
    /// Never fails: a missing, empty, corrupted or wrongly shaped file, or any
    /// read error, yields [`Document::default`].
    pub async fn load(&self) -> Document {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.path.display(),
                    "Data file not found, using default document"
                );
                return Document::default();
            }
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read data file, using default document"
                );
                return Document::default();
            }
        };

        if bytes.is_empty() {
            tracing::info!(
                path = %self.path.display(),
                "Data file is empty, using default document"
            );
            return Document::default();
        }

        let value: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Data file is not valid JSON, using default document"
                );
                return Document::default();
            }
        };

        match Document::from_value(value) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Data file has an unexpected structure, using default document"
                );
                Document::default()
            }
        }
    }

    /// Replace the stored document with `value`.
    ///
    /// Only the top level is checked: it must be a JSON object. Nested
    /// content is written as given.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotAnObject`] without touching the file when
    /// `value` is not an object, and [`StoreError::Io`] when the write fails.
    pub async fn save(&self, value: &Value) -> Result<(), StoreError> {
        if !value.is_object() {
            let found = json_kind(value);
            tracing::warn!(found, "Refusing to save a non-object document");
            return Err(StoreError::NotAnObject(found));
        }

        let bytes = to_pretty_json(value)?;

        if let Err(source) = self.write_atomic(&bytes).await {
            tracing::error!(
                path = %self.path.display(),
                error = %source,
                "Failed to write data file"
            );
            return Err(StoreError::Io {
                path: self.path.clone(),
                source,
            });
        }

        tracing::info!(
            path = %self.path.display(),
            bytes = bytes.len(),
            "Data saved"
        );
        Ok(())
    }

    async fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.temp_path();
        let result = write_then_rename(&tmp, &self.path, bytes).await;
        if result.is_err() {
            // Best effort; the temp file may never have been created.
            let _ = fs::remove_file(&tmp).await;
        }
        result
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "data".into(), |n| n.to_string_lossy().into_owned());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
    }
}

async fn write_then_rename(tmp: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(tmp, target).await
}

/// Serialize with a 4-space indent and a trailing newline.
fn to_pretty_json(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn store_in(dir: &TempDir) -> DataStore {
        DataStore::new(dir.path().join("data.json"))
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.load().await, Document::default());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_load_empty_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), b"").unwrap();

        assert_eq!(store.load().await, Document::default());
    }

    #[tokio::test]
    async fn test_load_corrupted_json_returns_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), b"{\"products\": [").unwrap();

        assert_eq!(store.load().await, Document::default());
    }

    #[tokio::test]
    async fn test_load_wrong_shape_returns_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        for contents in ["{}", "[1,2,3]", "\"products\"", "null", "{\"users\": []}"] {
            std::fs::write(store.path(), contents).unwrap();
            assert_eq!(store.load().await, Document::default(), "{contents}");
        }
    }

    #[tokio::test]
    async fn test_load_unreadable_path_returns_default() {
        let dir = TempDir::new().unwrap();
        let store = DataStore::new(dir.path());

        assert_eq!(store.load().await, Document::default());
    }

    #[tokio::test]
    async fn test_load_returns_stored_document_as_is() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"products": 5, "extra": true}"#).unwrap();

        let doc = store.load().await;
        assert_eq!(Value::from(doc), json!({"products": 5, "extra": true}));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let value = json!({
            "products": [{"id": 1, "name": "น้ำดื่ม", "price": 10.5}],
            "settings": {"currency": "THB"}
        });

        store.save(&value).await.unwrap();

        assert_eq!(Value::from(store.load().await), value);
    }

    #[tokio::test]
    async fn test_save_writes_literal_unicode_with_four_space_indent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .save(&json!({"products": [{"name": "น้ำดื่ม"}]}))
            .await
            .unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("น้ำดื่ม"));
        assert!(!text.contains("\\u"));
        assert!(text.starts_with("{\n    \"products\": [\n        {"));
        assert!(text.ends_with("}\n"));
    }

    #[tokio::test]
    async fn test_save_preserves_key_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .save(&json!({"zeta": 1, "products": [], "alpha": 2}))
            .await
            .unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        let zeta = text.find("zeta").unwrap();
        let products = text.find("products").unwrap();
        let alpha = text.find("alpha").unwrap();
        assert!(zeta < products && products < alpha);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_document() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .save(&json!({"products": [1, 2, 3], "users": [{"id": 1}]}))
            .await
            .unwrap();
        store.save(&json!({"products": []})).await.unwrap();

        assert_eq!(Value::from(store.load().await), json!({"products": []}));
    }

    #[tokio::test]
    async fn test_save_rejects_non_object_and_keeps_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"products": ["keep"]}"#).unwrap();

        let err = store.save(&json!([1, 2, 3])).await.unwrap_err();

        assert!(matches!(err, StoreError::NotAnObject("array")));
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            r#"{"products": ["keep"]}"#
        );
    }

    #[tokio::test]
    async fn test_save_accepts_object_without_products() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&json!({"settings": {}})).await.unwrap();

        assert!(store.path().exists());
        assert_eq!(store.load().await, Document::default());
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = DataStore::new(dir.path().join("nested/state/data.json"));

        store.save(&json!({"products": []})).await.unwrap();

        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_save_io_failure_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("data.json");
        std::fs::create_dir(&target).unwrap();
        let store = DataStore::new(&target);

        let err = store.save(&json!({"products": []})).await.unwrap_err();

        assert!(matches!(err, StoreError::Io { .. }));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let store = DataStore::new("/srv/pos/data.json");

        let first = store.temp_path();
        let second = store.temp_path();

        assert_eq!(first.parent(), Some(Path::new("/srv/pos")));
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".data.json."), "got {name}");
        assert!(name.ends_with(".tmp"), "got {name}");
        // `.data.json.` + 32 hex chars + `.tmp`
        assert_eq!(name.len(), 11 + 32 + 4);
        assert_ne!(first, second);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Io {
            path: PathBuf::from("/srv/data.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to write /srv/data.json: denied");
    }
}
