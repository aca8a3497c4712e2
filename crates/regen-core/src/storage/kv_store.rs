//! Key-value store trait.
//!
//! Defines the interface for namespaced key-value persistence.
//! Implementations live in regen-infra.

use regen_types::error::RepositoryError;

/// Trait for key-value persistent storage.
///
/// Stores arbitrary JSON values under string keys. Keys are expected to be
/// namespaced by the caller (e.g. `regen_used_image_urls`).
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Backend name for logs (e.g. "memory", "file", "sqlite").
    fn backend(&self) -> &str;

    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, RepositoryError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
