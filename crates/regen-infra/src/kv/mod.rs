//! Key-value backends for the used image store.
//!
//! [`open_kv_store`] picks the backend named in `[store]` and erases its type
//! so the rest of the process stays generic over `KvStore`.

pub mod file;
pub mod memory;

use std::path::Path;

use regen_core::storage::box_kv::BoxKvStore;
use regen_types::config::{StoreBackend, StoreConfig};
use regen_types::error::RepositoryError;

use crate::filesystem::{database_url, kv_file_path};
use crate::sqlite::kv::SqliteKvStore;
use crate::sqlite::pool::DatabasePool;

use self::file::FileKvStore;
use self::memory::MemoryKvStore;

/// Open the configured backend under `data_dir`.
pub async fn open_kv_store(
    config: &StoreConfig,
    data_dir: &Path,
) -> Result<BoxKvStore, RepositoryError> {
    let store = match config.backend {
        StoreBackend::Memory => BoxKvStore::new(MemoryKvStore::new()),
        StoreBackend::File => BoxKvStore::new(FileKvStore::new(kv_file_path(data_dir))),
        StoreBackend::Sqlite => {
            tokio::fs::create_dir_all(data_dir)
                .await
                .map_err(|e| RepositoryError::Io(e.to_string()))?;
            let pool = DatabasePool::new(&database_url(data_dir))
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to open SQLite database");
                    RepositoryError::Connection
                })?;
            BoxKvStore::new(SqliteKvStore::new(pool))
        }
    };

    tracing::debug!(backend = %config.backend, "Opened key-value store");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use regen_core::storage::kv_store::KvStore;

    use super::*;

    fn config(backend: StoreBackend) -> StoreConfig {
        StoreConfig {
            backend,
            ..StoreConfig::default()
        }
    }

    #[tokio::test]
    async fn test_each_backend_opens_and_stores() {
        let dir = tempfile::tempdir().unwrap();
        for backend in [StoreBackend::Memory, StoreBackend::File, StoreBackend::Sqlite] {
            let store = open_kv_store(&config(backend), dir.path()).await.unwrap();
            assert_eq!(store.backend(), backend.to_string());

            store.set("k", &serde_json::json!(["/a.png"])).await.unwrap();
            assert_eq!(
                store.get("k").await.unwrap(),
                Some(serde_json::json!(["/a.png"]))
            );
        }
    }

    #[tokio::test]
    async fn test_sqlite_creates_missing_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");
        let store = open_kv_store(&config(StoreBackend::Sqlite), &nested).await;
        assert!(store.is_ok());
        assert!(nested.join("regen.db").exists());
    }
}
