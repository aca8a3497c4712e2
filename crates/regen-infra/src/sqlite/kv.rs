//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `regen-core` using sqlx with split read/write pools.
//! Values are stored as JSON text and deserialized on read.

use chrono::Utc;
use sqlx::Row;

use regen_core::storage::kv_store::KvStore;
use regen_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KvStore`.
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    /// Create a new KV store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl KvStore for SqliteKvStore {
    fn backend(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let value_str: String = row
                    .try_get("value")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let value: serde_json::Value = serde_json::from_str(&value_str).map_err(|e| {
                    RepositoryError::Serialization(format!("invalid JSON value: {e}"))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let value_str = serde_json::to_string(value).map_err(|e| {
            RepositoryError::Serialization(format!("failed to serialize value: {e}"))
        })?;

        sqlx::query(
            r#"INSERT INTO kv_store (key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(&value_str)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use regen_core::storage::used_images::UsedImageStore;
    use tempfile::TempDir;

    use super::*;

    async fn test_pool() -> (TempDir, DatabasePool) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, pool)
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let (_dir, pool) = test_pool().await;
        let store = SqliteKvStore::new(pool);

        let value = serde_json::json!(["/a.png", "/b.png"]);
        store.set("used", &value).await.unwrap();

        assert_eq!(store.get("used").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_none() {
        let (_dir, pool) = test_pool().await;
        let store = SqliteKvStore::new(pool);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_upserts() {
        let (_dir, pool) = test_pool().await;
        let store = SqliteKvStore::new(pool);

        store.set("counter", &serde_json::json!(1)).await.unwrap();
        store.set("counter", &serde_json::json!(2)).await.unwrap();

        assert_eq!(store.get("counter").await.unwrap(), Some(serde_json::json!(2)));
    }

    #[tokio::test]
    async fn test_delete_removes_key() {
        let (_dir, pool) = test_pool().await;
        let store = SqliteKvStore::new(pool);

        store.set("gone", &serde_json::json!(true)).await.unwrap();
        store.delete("gone").await.unwrap();
        assert!(store.get("gone").await.unwrap().is_none());

        // Deleting an absent key is not an error
        store.delete("gone").await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_value_is_serialization_error() {
        let (_dir, pool) = test_pool().await;
        sqlx::query(
            "INSERT INTO kv_store (key, value, created_at, updated_at) VALUES ('bad', '{oops', '', '')",
        )
        .execute(&pool.writer)
        .await
        .unwrap();

        let store = SqliteKvStore::new(pool);
        assert!(matches!(
            store.get("bad").await,
            Err(RepositoryError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_used_images_survive_reopen() {
        let (_dir, pool) = test_pool().await;

        let store = UsedImageStore::open(SqliteKvStore::new(pool.clone()), "used", 100).await;
        store.add("/abc.jpg").await;
        store.add("data:image/png;base64,AAAA").await;

        let reopened = UsedImageStore::open(SqliteKvStore::new(pool), "used", 100).await;
        assert_eq!(reopened.snapshot(), ["/abc.jpg"]);
    }
}
