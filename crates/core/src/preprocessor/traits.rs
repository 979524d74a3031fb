//! Trait definitions for the preprocessor module.

use async_trait::async_trait;
use std::path::Path;

use super::error::PreprocessError;

/// The numerical preprocessing step.
///
/// Reads every file in `input_dir` and writes zero or more artifacts into
/// `output_dir`, one named `dispf<YYYYMMDDHH>` per lead time it can produce.
#[async_trait]
pub trait Preprocessor: Send + Sync {
    /// Returns the name of this preprocessor implementation.
    fn name(&self) -> &str;

    /// Runs preprocessing over the staged inputs.
    async fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<(), PreprocessError>;
}
