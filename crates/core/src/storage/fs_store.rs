//! File system object store implementation.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::debug;

use crate::forecast::FileDescriptor;

use super::config::FsStoreConfig;
use super::error::StorageError;
use super::traits::ObjectStore;
use super::types::{staging_path, UploadReceipt};

const BUFFER_SIZE: usize = 1024 * 1024;

/// Object store backed by two directories on a local or mounted file system.
pub struct FsObjectStore {
    config: FsStoreConfig,
}

impl FsObjectStore {
    /// Creates a new file system store with the given configuration.
    pub fn new(config: FsStoreConfig) -> Self {
        Self { config }
    }

    /// Resolves a key below `root`, refusing absolute keys and `..` segments.
    fn resolve(root: &Path, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !is_plain {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(root.join(relative))
    }

    /// Copies a file while computing its SHA-256.
    async fn copy_file(source: &Path, destination: &Path) -> Result<(u64, String), StorageError> {
        let source_file = File::open(source)
            .await
            .map_err(|e| StorageError::io(source, e))?;
        let dest_file = File::create(destination)
            .await
            .map_err(|e| StorageError::io(destination, e))?;

        let mut reader = BufReader::with_capacity(BUFFER_SIZE, source_file);
        let mut writer = BufWriter::with_capacity(BUFFER_SIZE, dest_file);
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut total_bytes = 0u64;

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .await
                .map_err(|e| StorageError::io(source, e))?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
            writer
                .write_all(&buffer[..bytes_read])
                .await
                .map_err(|e| StorageError::io(destination, e))?;
            total_bytes += bytes_read as u64;
        }

        writer
            .flush()
            .await
            .map_err(|e| StorageError::io(destination, e))?;

        Ok((total_bytes, format!("{:x}", hasher.finalize())))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn download(
        &self,
        descriptor: &FileDescriptor,
        dest_dir: &Path,
    ) -> Result<PathBuf, StorageError> {
        let source = Self::resolve(&self.config.input_root, &descriptor.key)?;
        if !fs::try_exists(&source)
            .await
            .map_err(|e| StorageError::io(&source, e))?
        {
            return Err(StorageError::NotFound {
                key: descriptor.key.clone(),
            });
        }

        let destination = staging_path(descriptor, dest_dir)?;
        let (bytes, _) = Self::copy_file(&source, &destination).await?;
        debug!(key = %descriptor.key, bytes, path = %destination.display(), "Downloaded object");

        Ok(destination)
    }

    async fn upload(&self, path: &Path, key: &str) -> Result<UploadReceipt, StorageError> {
        let destination = Self::resolve(&self.config.output_root, key)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        let (size_bytes, sha256) = Self::copy_file(path, &destination).await?;
        debug!(key, size_bytes, "Uploaded object");

        Ok(UploadReceipt {
            key: key.to_string(),
            size_bytes,
            sha256,
        })
    }
}
