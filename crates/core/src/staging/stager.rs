//! Staging downloader implementation.

use futures::future::try_join_all;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, error};

use crate::forecast::FileDescriptor;
use crate::metrics;
use crate::storage::{staging_path, ObjectStore};

use super::config::StagingConfig;
use super::error::DownloadError;

/// Prefix of staging directories.
const INPUT_DIR_PREFIX: &str = "flexprep-input-";

/// Files staged for one preprocessing invocation.
///
/// All paths live in `dir()`. The directory is removed when this value is
/// dropped.
#[derive(Debug)]
pub struct StagedInputs {
    dir: TempDir,
    paths: Vec<PathBuf>,
}

impl StagedInputs {
    /// Directory holding the staged files.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Local paths, in the order of the staged descriptors.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

/// Downloads window files into a fresh scratch directory.
pub struct Stager<S: ObjectStore> {
    store: Arc<S>,
    config: StagingConfig,
}

impl<S: ObjectStore> Stager<S> {
    /// Creates a new stager.
    pub fn new(store: Arc<S>, config: StagingConfig) -> Self {
        Self { store, config }
    }

    /// Downloads `descriptors` concurrently; returned paths keep input order.
    ///
    /// Every descriptor gets its own file. A window whose keys share a base
    /// name, or has a key without one, is rejected before anything is
    /// downloaded. Otherwise fails with the first download error; files
    /// already fetched are removed together with the staging directory.
    pub async fn stage(&self, descriptors: &[FileDescriptor]) -> Result<StagedInputs, DownloadError> {
        check_staged_names(descriptors).inspect_err(|e| {
            error!(error = %e, "Window cannot be staged");
        })?;

        let dir = self
            .config
            .tempdir(INPUT_DIR_PREFIX)
            .map_err(DownloadError::Workspace)?;

        let dest_dir = dir.path();
        let downloads = descriptors.iter().map(|descriptor| {
            let store = &self.store;
            async move {
                store
                    .download(descriptor, dest_dir)
                    .await
                    .map_err(|e| DownloadError::Transfer {
                        key: descriptor.key.clone(),
                        source: e,
                    })
            }
        });

        let paths = match try_join_all(downloads).await {
            Ok(paths) => paths,
            Err(e) => {
                error!(error = %e, "File download failed");
                return Err(e);
            }
        };

        metrics::FILES_STAGED.inc_by(paths.len() as u64);
        debug!(
            dir = %dir.path().display(),
            files = paths.len(),
            store = self.store.name(),
            "Staged window files"
        );

        Ok(StagedInputs { dir, paths })
    }
}

/// Ensures each descriptor maps to a distinct, valid staged file name.
fn check_staged_names(descriptors: &[FileDescriptor]) -> Result<(), DownloadError> {
    let mut seen: HashMap<&str, &str> = HashMap::with_capacity(descriptors.len());
    for descriptor in descriptors {
        staging_path(descriptor, Path::new("")).map_err(|e| DownloadError::Transfer {
            key: descriptor.key.clone(),
            source: e,
        })?;
        if let Some(first) = seen.insert(descriptor.file_name(), &descriptor.key) {
            return Err(DownloadError::DuplicateName {
                name: descriptor.file_name().to_string(),
                first: first.to_string(),
                second: descriptor.key.clone(),
            });
        }
    }
    Ok(())
}
