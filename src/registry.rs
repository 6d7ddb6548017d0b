//! Scan spec registry.
//!
//! CRUD over [`ScanSpec`] records stored as JSON blobs, one object per spec
//! under the key `<id>.json`. Specs are never updated in place.

use crate::error::{ServiceError, ServiceResult, StorageError};
use crate::storage::BlobStore;
use crate::types::{ScanRequest, ScanSpec, SpecId};
use chrono::Utc;
use tracing::{debug, info};

/// Registry of scan specs backed by a blob store.
pub struct SpecRegistry<B> {
    store: B,
}

impl<B: BlobStore> SpecRegistry<B> {
    /// Create a registry over `store`.
    pub fn new(store: B) -> Self {
        Self { store }
    }

    /// The backing store.
    pub fn store(&self) -> &B {
        &self.store
    }

    /// Persist a new spec with a fresh ID and creation time.
    pub async fn create(&self, request: ScanRequest) -> ServiceResult<ScanSpec> {
        request.validate().map_err(ServiceError::Validation)?;

        let spec = request.into_spec(SpecId::new(), Utc::now().timestamp().to_string());
        let body = serde_json::to_vec(&spec)?;
        self.store.put(&spec.id.storage_key(), body).await?;

        info!(id = %spec.id, repository = %spec.repository, "registered scan spec");
        Ok(spec)
    }

    /// Load a spec by ID.
    pub async fn get(&self, id: &SpecId) -> ServiceResult<ScanSpec> {
        let bytes = match self.store.get(&id.storage_key()).await {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound(_)) => return Err(ServiceError::NotFound(id.to_string())),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// List the IDs of all stored specs, in store listing order.
    ///
    /// Objects without the spec extension are skipped.
    pub async fn list_ids(&self) -> ServiceResult<Vec<SpecId>> {
        let mut ids = Vec::new();

        for key in self.store.list().await? {
            match SpecId::from_storage_key(&key) {
                Some(Ok(id)) => ids.push(id),
                Some(Err(_)) => return Err(StorageError::InvalidKey(key).into()),
                None => debug!(key = %key, "skipping non-spec object"),
            }
        }

        Ok(ids)
    }

    /// Load all stored specs, in store listing order.
    ///
    /// The first spec that fails to load aborts the listing.
    pub async fn list(&self) -> ServiceResult<Vec<ScanSpec>> {
        let ids = self.list_ids().await?;
        let mut specs = Vec::with_capacity(ids.len());

        for id in ids {
            specs.push(self.get(&id).await?);
        }

        Ok(specs)
    }

    /// Whether a spec with this ID is currently listed in the store.
    ///
    /// Compares raw keys, so unrelated objects never affect the answer.
    pub async fn exists(&self, id: &SpecId) -> ServiceResult<bool> {
        let key = id.storage_key();
        Ok(self.store.list().await?.contains(&key))
    }

    /// Delete a spec. Deleting an unknown ID succeeds.
    pub async fn delete(&self, id: &SpecId) -> ServiceResult<()> {
        self.store.delete(&id.storage_key()).await?;
        info!(id = %id, "deleted scan spec");
        Ok(())
    }
}
