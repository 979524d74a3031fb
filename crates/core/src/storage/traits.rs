//! Trait definitions for the storage module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::forecast::FileDescriptor;

use super::error::StorageError;
use super::types::UploadReceipt;

/// Client for the object store holding forecast inputs and artifacts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Fetches the object located by `descriptor` into `dest_dir`.
    ///
    /// Returns the local path of the downloaded file, named after the base
    /// name of the object key.
    async fn download(
        &self,
        descriptor: &FileDescriptor,
        dest_dir: &Path,
    ) -> Result<PathBuf, StorageError>;

    /// Uploads a local file under `key`, replacing any existing object.
    async fn upload(&self, path: &Path, key: &str) -> Result<UploadReceipt, StorageError>;
}
