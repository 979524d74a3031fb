//! Configuration for the staging module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where temporary input and output directories are created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Parent directory for scratch directories (system temp dir when unset).
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

impl StagingConfig {
    /// Creates a config rooted at `work_dir`.
    pub fn with_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: Some(work_dir.into()),
        }
    }

    /// Creates a scratch directory with the given prefix.
    pub fn tempdir(&self, prefix: &str) -> std::io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);
        match &self.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        }
    }
}
