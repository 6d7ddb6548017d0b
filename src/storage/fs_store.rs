//! Directory-backed blob store.
//!
//! Stores each object as a separate file named after its key. Useful for
//! running the registry without an object store, and for local testing.

use super::BlobStore;
use crate::config::Paths;
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-per-key blob store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        std::fs::create_dir_all(&root).map_err(|e| StorageError::WriteFailed {
            key: root.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { root })
    }

    /// Open the store in the default data directory.
    pub fn open_default() -> StorageResult<Self> {
        let paths = Paths::get().map_err(|e| StorageError::ListFailed(e.to_string()))?;
        Self::open(paths.specs_dir())
    }

    /// The directory holding the objects.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the file path for a key.
    fn object_file(&self, key: &str) -> StorageResult<PathBuf> {
        let plain = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\']);

        if !plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FsStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        let file = self.object_file(key)?;

        fs::write(&file, bytes)
            .await
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let file = self.object_file(key)?;

        match fs::read(&file).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let file = self.object_file(key)?;

        match fs::remove_file(&file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?;
        let mut keys = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?
        {
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?
                .is_file();

            if is_file {
                keys.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        // Directory order is arbitrary; keep listings stable.
        keys.sort();

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_and_get() {
        let tmp = TempDir::new().unwrap();
        let store = FsStore::open(tmp.path()).unwrap();

        store.put("one.json", b"{\"a\":1}".to_vec()).await.unwrap();
        assert_eq!(store.get("one.json").await.unwrap(), b"{\"a\":1}");
        assert!(tmp.path().join("one.json").exists());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let tmp = TempDir::new().unwrap();
        let store = FsStore::open(tmp.path()).unwrap();

        assert!(matches!(
            store.get("missing.json").await,
            Err(StorageError::NotFound(key)) if key == "missing.json"
        ));
    }

    #[tokio::test]
    async fn test_list_skips_directories() {
        let tmp = TempDir::new().unwrap();
        let store = FsStore::open(tmp.path()).unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();

        store.put("b.json", Vec::new()).await.unwrap();
        store.put("a.json", Vec::new()).await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["a.json", "b.json"]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = FsStore::open(tmp.path()).unwrap();

        store.put("gone.json", Vec::new()).await.unwrap();
        store.delete("gone.json").await.unwrap();
        store.delete("gone.json").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_path_keys() {
        let tmp = TempDir::new().unwrap();
        let store = FsStore::open(tmp.path()).unwrap();

        assert!(matches!(
            store.put("../escape.json", Vec::new()).await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
