//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let key = key.to_string();
        Box::pin(async move {
            let values = self.values.read().map_err(lock_error)?;
            Ok(values.get(&key).cloned())
        })
    }

    fn set(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let value = value.to_string();
        Box::pin(async move {
            let mut values = self.values.write().map_err(lock_error)?;
            values.insert(key, value);
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut values = self.values.write().map_err(lock_error)?;
            values.remove(&key);
            Ok(())
        })
    }

    fn keys(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let values = self.values.read().map_err(lock_error)?;
            Ok(values.keys().cloned().collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;

    #[test]
    fn test_set_and_get() {
        let storage = MemoryStorage::new();
        block_on(storage.set("theme", "dark")).unwrap();
        assert_eq!(block_on(storage.get("theme")).unwrap(), Some("dark".to_string()));
    }

    #[test]
    fn test_missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(block_on(storage.get("nope")).unwrap(), None);
    }

    #[test]
    fn test_overwrite_and_remove() {
        let storage = MemoryStorage::new();
        block_on(storage.set("k", "1")).unwrap();
        block_on(storage.set("k", "2")).unwrap();
        assert_eq!(block_on(storage.get("k")).unwrap().as_deref(), Some("2"));

        block_on(storage.remove("k")).unwrap();
        block_on(storage.remove("k")).unwrap();
        assert_eq!(block_on(storage.get("k")).unwrap(), None);
    }

    #[test]
    fn test_keys() {
        let storage = MemoryStorage::new();
        block_on(storage.set("b", "x")).unwrap();
        block_on(storage.set("a", "y")).unwrap();
        assert_eq!(block_on(storage.keys()).unwrap(), vec!["a", "b"]);
    }
}
