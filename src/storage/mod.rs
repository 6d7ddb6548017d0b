//! Blob storage backing the scan spec registry.
//!
//! The registry only needs a flat key/value store: put, get, delete and list.
//! Backends are S3, a local directory of JSON files, and an in-memory map.

mod fs_store;
mod memory;
mod s3;

pub use fs_store::FsStore;
pub use memory::MemoryStore;
pub use s3::S3Store;

use crate::error::StorageResult;
use async_trait::async_trait;
use std::sync::Arc;

/// A key/value object store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()>;

    /// Read the object at `key`.
    ///
    /// Returns [`StorageError::NotFound`](crate::error::StorageError::NotFound)
    /// if no object exists.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Remove the object at `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// List every key in the store, in the backend's listing order.
    async fn list(&self) -> StorageResult<Vec<String>>;
}

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        (**self).put(key, bytes).await
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        (**self).get(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key).await
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        (**self).list().await
    }
}

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Box<T> {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        (**self).put(key, bytes).await
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        (**self).get(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key).await
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        (**self).list().await
    }
}

/// A boxed blob store for dynamic dispatch.
pub type BoxedBlobStore = Box<dyn BlobStore>;
