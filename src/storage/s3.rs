//! S3 blob store.

use super::BlobStore;
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

/// Blob store over a single S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Create a store for `bucket` using the given SDK configuration.
    pub fn new(sdk_config: &SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk_config),
            bucket: bucket.into(),
        }
    }

    /// The backing bucket.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl BlobStore for S3Store {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        debug!(bucket = %self.bucket, key, "put object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        debug!(bucket = %self.bucket, key, "get object");

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    key: key.to_string(),
                    reason: DisplayErrorContext(&e).to_string(),
                });
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::ReadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        Ok(body.into_bytes().to_vec())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        debug!(bucket = %self.bucket, key, "delete object");

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed {
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StorageError::ListFailed(DisplayErrorContext(&e).to_string()))?;

            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match page.next_continuation_token() {
                Some(token) if page.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!(bucket = %self.bucket, count = keys.len(), "listed objects");
        Ok(keys)
    }
}
