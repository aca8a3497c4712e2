//! JSON document key-value store.
//!
//! All keys live in one JSON object on disk. Writes replace the file through
//! a temporary sibling and a rename, so readers never see a partial document.

use std::path::{Path, PathBuf};

use regen_core::storage::kv_store::KvStore;
use regen_types::error::RepositoryError;

type Document = serde_json::Map<String, serde_json::Value>;

/// File-backed `KvStore`.
pub struct FileKvStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileKvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Document, RepositoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(RepositoryError::Io(e.to_string())),
        };

        if content.trim().is_empty() {
            return Ok(Document::new());
        }

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => Err(RepositoryError::Serialization(format!(
                "{} is not a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(RepositoryError::Serialization(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn write_document(&self, document: &Document) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RepositoryError::Io(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(document)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| RepositoryError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| RepositoryError::Io(e.to_string()))
    }

    /// Read-modify-write under the write lock. A corrupt document is
    /// replaced rather than blocking every future write.
    async fn update<F>(&self, mutate: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut Document) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut document = match self.read_document().await {
            Ok(document) => document,
            Err(RepositoryError::Serialization(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Replacing corrupt store file");
                Document::new()
            }
            Err(e) => return Err(e),
        };
        mutate(&mut document);
        self.write_document(&document).await
    }
}

impl KvStore for FileKvStore {
    fn backend(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        Ok(self.read_document().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        let value = value.clone();
        self.update(|document| {
            document.insert(key.to_string(), value);
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.update(|document| {
            document.remove(key);
        })
        .await
    }
}
