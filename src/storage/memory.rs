//! In-memory blob store.
//!
//! Used by tests and dry runs; nothing survives the process.

use super::BlobStore;
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Blob store holding objects in an ordered map. Lists keys in lexicographic order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or_default()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned(key: &str) -> StorageError {
        StorageError::ReadFailed {
            key: key.to_string(),
            reason: "store lock poisoned".to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        let mut objects = self.objects.write().map_err(|_| StorageError::WriteFailed {
            key: key.to_string(),
            reason: "store lock poisoned".to_string(),
        })?;
        objects.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let objects = self.objects.read().map_err(|_| Self::poisoned(key))?;
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut objects = self.objects.write().map_err(|_| StorageError::DeleteFailed {
            key: key.to_string(),
            reason: "store lock poisoned".to_string(),
        })?;
        objects.remove(key);
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let objects = self
            .objects
            .read()
            .map_err(|_| StorageError::ListFailed("store lock poisoned".to_string()))?;
        Ok(objects.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        store.put("a.json", b"{}".to_vec()).await.unwrap();

        assert_eq!(store.get("a.json").await.unwrap(), b"{}");
        assert_eq!(store.list().await.unwrap(), vec!["a.json".to_string()]);

        store.delete("a.json").await.unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.get("a.json").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MemoryStore::new();
        tokio_test::assert_ok!(store.delete("missing.json").await);
    }
}
