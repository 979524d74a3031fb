//! Types for the storage module.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::forecast::FileDescriptor;

use super::error::StorageError;

/// Local path a descriptor is downloaded to inside `dest_dir`.
///
/// The file keeps the base name of its key. Keys whose base name is empty,
/// `.` or `..` cannot be staged.
pub fn staging_path(
    descriptor: &FileDescriptor,
    dest_dir: &Path,
) -> Result<PathBuf, StorageError> {
    match descriptor.file_name() {
        "" | "." | ".." => Err(StorageError::InvalidKey {
            key: descriptor.key.clone(),
        }),
        name => Ok(dest_dir.join(name)),
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Key the object was stored under.
    pub key: String,
    /// Size of the uploaded content.
    pub size_bytes: u64,
    /// Hex encoded SHA-256 of the uploaded content.
    pub sha256: String,
}

impl UploadReceipt {
    /// Builds a receipt for the given content.
    pub fn for_content(key: impl Into<String>, content: &[u8]) -> Self {
        Self {
            key: key.into(),
            size_bytes: content.len() as u64,
            sha256: format!("{:x}", Sha256::digest(content)),
        }
    }
}
