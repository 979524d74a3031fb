//! Object store access for forecast inputs and preprocessed artifacts.
//!
//! The `ObjectStore` trait is the only seam the processing pipeline uses to
//! move bytes. Two implementations are provided:
//!
//! - `HttpObjectStore`: S3-compatible HTTP endpoint, separate input and
//!   output buckets
//! - `FsObjectStore`: input and output directories on a mounted file system
//!
//! Retries and authentication are not handled here.

mod config;
mod error;
mod fs_store;
mod http_store;
mod traits;
mod types;

pub use config::{BucketConfig, FsStoreConfig, HttpStoreConfig, StorageBackend, StorageConfig};
pub use error::StorageError;
pub use fs_store::FsObjectStore;
pub use http_store::HttpObjectStore;
pub use traits::ObjectStore;
pub use types::{staging_path, UploadReceipt};
