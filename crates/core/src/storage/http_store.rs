//! S3-compatible HTTP object store implementation.
//!
//! Uses path-style addressing (`{endpoint}/{bucket}/{key}`). Request signing
//! is not performed; deployments put the store behind a gateway or grant the
//! worker anonymous access to both buckets.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::forecast::FileDescriptor;

use super::config::{BucketConfig, HttpStoreConfig};
use super::error::StorageError;
use super::traits::ObjectStore;
use super::types::{staging_path, UploadReceipt};

/// Header carrying the hex SHA-256 of the request payload.
const CONTENT_SHA256_HEADER: &str = "x-amz-content-sha256";

/// HTTP client for an S3-compatible object store.
pub struct HttpObjectStore {
    client: Client,
    config: HttpStoreConfig,
}

impl HttpObjectStore {
    /// Creates a new store client with the given configuration.
    pub fn new(config: HttpStoreConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(StorageError::ClientBuild)?;
        Ok(Self { client, config })
    }

    /// Builds the URL of an object, percent-encoding each key segment.
    fn object_url(bucket: &BucketConfig, key: &str) -> String {
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}",
            bucket.endpoint_url.trim_end_matches('/'),
            bucket.name,
            encoded_key
        )
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn download(
        &self,
        descriptor: &FileDescriptor,
        dest_dir: &Path,
    ) -> Result<PathBuf, StorageError> {
        let key = &descriptor.key;
        let destination = staging_path(descriptor, dest_dir)?;
        let url = Self::object_url(&self.config.input, key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StorageError::Request {
                key: key.clone(),
                source: e,
            })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(StorageError::NotFound { key: key.clone() }),
            status => {
                return Err(StorageError::Status {
                    key: key.clone(),
                    status: status.as_u16(),
                })
            }
        }

        let body = response.bytes().await.map_err(|e| StorageError::Request {
            key: key.clone(),
            source: e,
        })?;

        tokio::fs::write(&destination, &body)
            .await
            .map_err(|e| StorageError::io(&destination, e))?;
        debug!(key = %key, bytes = body.len(), "Downloaded object");

        Ok(destination)
    }

    async fn upload(&self, path: &Path, key: &str) -> Result<UploadReceipt, StorageError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        let receipt = UploadReceipt::for_content(key, &content);
        let url = Self::object_url(&self.config.output, key);

        let response = self
            .client
            .put(&url)
            .header(CONTENT_SHA256_HEADER, &receipt.sha256)
            .body(content)
            .send()
            .await
            .map_err(|e| StorageError::Request {
                key: key.to_string(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(StorageError::Status {
                key: key.to_string(),
                status: response.status().as_u16(),
            });
        }
        debug!(key, size_bytes = receipt.size_bytes, "Uploaded object");

        Ok(receipt)
    }
}
