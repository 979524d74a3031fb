//! Configuration for the storage module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Object store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backend to use.
    pub backend: StorageBackend,
    /// S3-compatible HTTP settings (required when backend = "http").
    #[serde(default)]
    pub http: Option<HttpStoreConfig>,
    /// Filesystem settings (required when backend = "filesystem").
    #[serde(default)]
    pub filesystem: Option<FsStoreConfig>,
}

/// Available object store backends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Http,
    Filesystem,
}

/// A bucket on an S3-compatible endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BucketConfig {
    /// Endpoint URL (e.g., "https://object-store.example.com").
    pub endpoint_url: String,
    /// Bucket name.
    pub name: String,
}

/// S3-compatible HTTP backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpStoreConfig {
    /// Bucket holding the forecast input files.
    pub input: BucketConfig,
    /// Bucket receiving the preprocessed artifacts.
    pub output: BucketConfig,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Filesystem backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsStoreConfig {
    /// Directory holding the forecast input files, addressed by key.
    pub input_root: PathBuf,
    /// Directory receiving the preprocessed artifacts.
    pub output_root: PathBuf,
}

fn default_timeout() -> u64 {
    300
}
