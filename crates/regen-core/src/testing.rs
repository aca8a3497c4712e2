//! Test doubles shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use regen_types::error::RepositoryError;

use crate::storage::kv_store::KvStore;

/// Shared in-memory backend; clones see the same data, like two processes
/// opening the same file.
#[derive(Clone, Default)]
pub struct SharedKv {
    pub data: Arc<Mutex<HashMap<String, serde_json::Value>>>,
    pub fail_reads: bool,
}

impl SharedKv {
    pub fn raw(&self, key: &str) -> Option<serde_json::Value> {
        self.data.lock().unwrap().get(key).cloned()
    }
}

impl KvStore for SharedKv {
    fn backend(&self) -> &str {
        "shared"
    }

    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        if self.fail_reads {
            return Err(RepositoryError::Serialization(
                "expected value at line 1 column 1".to_string(),
            ));
        }
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        self.data.lock().unwrap().insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.data.lock().unwrap().remove(key);
        Ok(())
    }
}
