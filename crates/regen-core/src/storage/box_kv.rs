//! BoxKvStore -- object-safe dynamic dispatch wrapper for KvStore.
//!
//! Same blanket-impl pattern as the other boxed ports:
//! 1. Define an object-safe `KvStoreDyn` trait with boxed futures
//! 2. Blanket-impl `KvStoreDyn` for all `T: KvStore`
//! 3. `BoxKvStore` wraps `Box<dyn KvStoreDyn>` and implements `KvStore` itself
//!
//! This lets the hosting environment pick a backend at runtime from config
//! while the rest of the code stays generic over `KvStore`.

use std::future::Future;
use std::pin::Pin;

use regen_types::error::RepositoryError;

use super::kv_store::KvStore;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`KvStore`] with boxed futures.
pub trait KvStoreDyn: Send + Sync {
    fn backend(&self) -> &str;

    fn get_boxed<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<serde_json::Value>, RepositoryError>>;

    fn set_boxed<'a>(
        &'a self,
        key: &'a str,
        value: &'a serde_json::Value,
    ) -> BoxFuture<'a, Result<(), RepositoryError>>;

    fn delete_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), RepositoryError>>;
}

/// Blanket implementation: any `KvStore` automatically implements `KvStoreDyn`.
impl<T: KvStore> KvStoreDyn for T {
    fn backend(&self) -> &str {
        KvStore::backend(self)
    }

    fn get_boxed<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<serde_json::Value>, RepositoryError>> {
        Box::pin(self.get(key))
    }

    fn set_boxed<'a>(
        &'a self,
        key: &'a str,
        value: &'a serde_json::Value,
    ) -> BoxFuture<'a, Result<(), RepositoryError>> {
        Box::pin(self.set(key, value))
    }

    fn delete_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), RepositoryError>> {
        Box::pin(self.delete(key))
    }
}

/// Type-erased key-value store for runtime backend selection.
pub struct BoxKvStore {
    inner: Box<dyn KvStoreDyn>,
}

impl BoxKvStore {
    /// Wrap a concrete `KvStore` in a type-erased box.
    pub fn new<T: KvStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }
}

impl KvStore for BoxKvStore {
    fn backend(&self) -> &str {
        self.inner.backend()
    }

    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        self.inner.get_boxed(key).await
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        self.inner.set_boxed(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.inner.delete_boxed(key).await
    }
}
