//! Persisted record of image identifiers already shown.
//!
//! `UsedImageStore` keeps an in-memory [`ExclusionSet`] and mirrors it into a
//! [`KvStore`] as a JSON array of strings under one namespaced key. The store
//! is constructed once per process and shared by every consumer, so all
//! screens draw from a single "don't repeat images" pool.
//!
//! Persistence is best-effort: unreadable or malformed state loads as empty,
//! and failed writes are logged. Inline payload identifiers (`data:` URIs)
//! live in memory only.
//!
//! Writes go through one async lock that is held from snapshot to `set`, so
//! the backend always ends up with the newest snapshot.

use std::sync::{Mutex, MutexGuard, PoisonError};

use regen_types::image::ExclusionSet;
use tokio::sync::Mutex as AsyncMutex;

use super::kv_store::KvStore;

/// In-memory exclusion set mirrored to a key-value backend.
pub struct UsedImageStore<S> {
    kv: S,
    key: String,
    entries: Mutex<ExclusionSet>,
    write: AsyncMutex<()>,
}

impl<S: KvStore> UsedImageStore<S> {
    /// Create a store and restore its persisted state.
    pub async fn open(kv: S, key: impl Into<String>, capacity: usize) -> Self {
        let store = Self {
            kv,
            key: key.into(),
            entries: Mutex::new(ExclusionSet::new(capacity)),
            write: AsyncMutex::new(()),
        };
        store.load().await;
        store
    }

    /// Replace the in-memory set with the most recent persisted entries.
    ///
    /// Absent, corrupt, or unreadable state yields an empty set.
    pub async fn load(&self) -> ExclusionSet {
        let capacity = self.lock().capacity();
        let restored = ExclusionSet::from_entries(capacity, self.read_persisted().await);

        tracing::debug!(
            backend = self.kv.backend(),
            key = %self.key,
            count = restored.len(),
            "Restored used images"
        );

        *self.lock() = restored.clone();
        restored
    }

    /// Record an identifier and re-persist.
    pub async fn add(&self, identifier: &str) {
        let _write = self.write.lock().await;
        let persistable = {
            let mut entries = self.lock();
            if !entries.insert(identifier) {
                return;
            }
            entries.persistable()
        };
        self.persist(persistable).await;
    }

    /// Forget every identifier, in memory and in the backend.
    pub async fn clear(&self) {
        let _write = self.write.lock().await;
        self.lock().clear();
        if let Err(e) = self.kv.delete(&self.key).await {
            tracing::warn!(
                backend = self.kv.backend(),
                error = %e,
                "Failed to clear persisted used images"
            );
        }
    }

    /// Current exclusion list, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().to_vec()
    }

    pub fn exclusion_set(&self) -> ExclusionSet {
        self.lock().clone()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.lock().contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn backend(&self) -> &str {
        self.kv.backend()
    }

    fn lock(&self) -> MutexGuard<'_, ExclusionSet> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn read_persisted(&self) -> Vec<String> {
        let value = match self.kv.get(&self.key).await {
            Ok(Some(value)) => value,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(
                    backend = self.kv.backend(),
                    error = %e,
                    "Used image state unreadable, starting empty"
                );
                return Vec::new();
            }
        };

        match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            other => {
                tracing::warn!(
                    backend = self.kv.backend(),
                    kind = json_kind(&other),
                    "Used image state is not an array, starting empty"
                );
                Vec::new()
            }
        }
    }

    async fn persist(&self, entries: Vec<String>) {
        let value = serde_json::Value::from(entries);
        if let Err(e) = self.kv.set(&self.key, &value).await {
            tracing::warn!(
                backend = self.kv.backend(),
                error = %e,
                "Failed to persist used images"
            );
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
