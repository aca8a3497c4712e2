//! SQLite connections for the `sqlite` store backend.
//!
//! The used image list is one row rewritten on every `add`, read once at
//! startup and by `regen used list`. A single writer connection keeps those
//! rewrites ordered; a small read-only pool serves lookups alongside it in
//! WAL mode.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Read-only connections opened next to the writer.
const READER_CONNECTIONS: u32 = 2;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Writer and reader pools over one `regen.db` file.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open (creating if needed) the database at `database_url` and bring the
    /// `kv_store` schema up to date.
    ///
    /// Migrations run on the writer before any reader connects, so readers
    /// never observe a missing table.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = connect_options(database_url)?;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        tracing::debug!(url = database_url, "Opened used image database");
        Ok(Self { reader, writer })
    }
}

fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .create_if_missing(true))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn db_url(dir: &TempDir) -> String {
        format!("sqlite://{}", dir.path().join("regen.db").display())
    }

    #[tokio::test]
    async fn test_kv_store_schema() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::new(&db_url(&dir)).await.unwrap();

        let columns: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM pragma_table_info('kv_store') ORDER BY cid")
                .fetch_all(&pool.reader)
                .await
                .unwrap();
        let columns: Vec<&str> = columns.iter().map(|c| c.0.as_str()).collect();
        assert_eq!(columns, ["key", "value", "created_at", "updated_at"]);
    }

    #[tokio::test]
    async fn test_reopen_keeps_rows_and_applies_migration_once() {
        let dir = tempfile::tempdir().unwrap();
        let url = db_url(&dir);

        let first = DatabasePool::new(&url).await.unwrap();
        sqlx::query(
            "INSERT INTO kv_store (key, value, created_at, updated_at) \
             VALUES ('regen_used_image_urls', '[\"/a.png\"]', 'now', 'now')",
        )
        .execute(&first.writer)
        .await
        .unwrap();
        first.writer.close().await;
        first.reader.close().await;

        let second = DatabasePool::new(&url).await.unwrap();
        let (value,): (String,) =
            sqlx::query_as("SELECT value FROM kv_store WHERE key = 'regen_used_image_urls'")
                .fetch_one(&second.reader)
                .await
                .unwrap();
        assert_eq!(value, "[\"/a.png\"]");

        let (applied,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(&second.reader)
            .await
            .unwrap();
        assert_eq!(applied, 1);
    }

    #[tokio::test]
    async fn test_reader_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::new(&db_url(&dir)).await.unwrap();

        let result = sqlx::query("DELETE FROM kv_store").execute(&pool.reader).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_writer_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::new(&db_url(&dir)).await.unwrap();

        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
