//! Mock object store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::forecast::FileDescriptor;
use crate::storage::{staging_path, ObjectStore, StorageError, UploadReceipt};

/// A recorded upload for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    /// Key the object was uploaded under.
    pub key: String,
    /// Uploaded content.
    pub content: Vec<u8>,
}

/// Mock implementation of the ObjectStore trait.
///
/// Inputs are served from memory. Clones share state, so a test can keep a
/// clone for assertions after handing one to the pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use flexprep_core::testing::MockObjectStore;
///
/// let store = MockObjectStore::new();
/// store.put_input("ifs/2024030100/step_006", b"grib").await;
///
/// // ... run the pipeline ...
///
/// let uploads = store.recorded_uploads().await;
/// assert_eq!(uploads[0].key, "dispf2024030106");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockObjectStore {
    /// Input objects by key.
    inputs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    /// Keys downloaded, in call order.
    downloads: Arc<RwLock<Vec<String>>>,
    /// Recorded uploads.
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    /// If set, the next download will fail with this error.
    next_download_error: Arc<RwLock<Option<StorageError>>>,
    /// If set, the next upload will fail with this error.
    next_upload_error: Arc<RwLock<Option<StorageError>>>,
}

impl MockObjectStore {
    /// Create a new mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input object.
    pub async fn put_input(&self, key: &str, content: &[u8]) {
        self.inputs
            .write()
            .await
            .insert(key.to_string(), content.to_vec());
    }

    /// Add every descriptor of a batch as an input object, content = key.
    pub async fn put_batch(&self, batch: &[FileDescriptor]) {
        for descriptor in batch {
            self.put_input(&descriptor.key, descriptor.key.as_bytes())
                .await;
        }
    }

    /// Get the keys downloaded so far.
    pub async fn recorded_downloads(&self) -> Vec<String> {
        self.downloads.read().await.clone()
    }

    /// Get the number of downloads performed.
    pub async fn download_count(&self) -> usize {
        self.downloads.read().await.len()
    }

    /// Get all recorded uploads.
    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    /// Get the number of uploads performed.
    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    /// Configure the next download to fail with the given error.
    pub async fn set_next_download_error(&self, error: StorageError) {
        *self.next_download_error.write().await = Some(error);
    }

    /// Configure the next upload to fail with the given error.
    pub async fn set_next_upload_error(&self, error: StorageError) {
        *self.next_upload_error.write().await = Some(error);
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn download(
        &self,
        descriptor: &FileDescriptor,
        dest_dir: &Path,
    ) -> Result<PathBuf, StorageError> {
        if let Some(err) = self.next_download_error.write().await.take() {
            return Err(err);
        }

        let content = self
            .inputs
            .read()
            .await
            .get(&descriptor.key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                key: descriptor.key.clone(),
            })?;

        let destination = staging_path(descriptor, dest_dir)?;
        tokio::fs::write(&destination, content)
            .await
            .map_err(|e| StorageError::io(&destination, e))?;
        self.downloads.write().await.push(descriptor.key.clone());

        Ok(destination)
    }

    async fn upload(&self, path: &Path, key: &str) -> Result<UploadReceipt, StorageError> {
        if let Some(err) = self.next_upload_error.write().await.take() {
            return Err(err);
        }

        let content = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        let receipt = UploadReceipt::for_content(key, &content);
        self.uploads.write().await.push(RecordedUpload {
            key: key.to_string(),
            content,
        });

        Ok(receipt)
    }
}
