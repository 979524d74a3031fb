//! Mock preprocessor for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::preprocessor::{PreprocessError, Preprocessor};

/// A recorded preprocessing run for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRun {
    /// Input directory handed to the preprocessor.
    pub input_dir: PathBuf,
    /// Output directory handed to the preprocessor.
    pub output_dir: PathBuf,
    /// Names of the files present in the input directory, sorted.
    pub input_files: Vec<String>,
}

/// Mock implementation of the Preprocessor trait.
///
/// Writes a configured set of output files and records what it saw:
/// - Configure outputs with `add_output`
/// - Simulate failure with `set_next_error`
/// - Simulate an input vanishing during the run with `remove_input_during_run`
#[derive(Debug, Clone, Default)]
pub struct MockPreprocessor {
    /// Files written into the output directory on every run.
    outputs: Arc<RwLock<Vec<(String, Vec<u8>)>>>,
    /// Input file names deleted during the run.
    remove_inputs: Arc<RwLock<Vec<String>>>,
    /// Recorded runs.
    runs: Arc<RwLock<Vec<RecordedRun>>>,
    /// If set, the next run will fail with this error.
    next_error: Arc<RwLock<Option<PreprocessError>>>,
}

impl MockPreprocessor {
    /// Create a new mock preprocessor that produces no output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `name` with `content` into the output directory on each run.
    pub async fn add_output(&self, name: &str, content: &[u8]) {
        self.outputs
            .write()
            .await
            .push((name.to_string(), content.to_vec()));
    }

    /// Delete the staged input `name` while running.
    pub async fn remove_input_during_run(&self, name: &str) {
        self.remove_inputs.write().await.push(name.to_string());
    }

    /// Configure the next run to fail with the given error.
    pub async fn set_next_error(&self, error: PreprocessError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all recorded runs.
    pub async fn recorded_runs(&self) -> Vec<RecordedRun> {
        self.runs.read().await.clone()
    }

    /// Get the number of runs performed.
    pub async fn run_count(&self) -> usize {
        self.runs.read().await.len()
    }
}

#[async_trait]
impl Preprocessor for MockPreprocessor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<(), PreprocessError> {
        let mut input_files = Vec::new();
        let mut entries = tokio::fs::read_dir(input_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            input_files.push(entry.file_name().to_string_lossy().to_string());
        }
        input_files.sort();

        self.runs.write().await.push(RecordedRun {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            input_files,
        });

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        for name in self.remove_inputs.read().await.iter() {
            tokio::fs::remove_file(input_dir.join(name)).await?;
        }

        for (name, content) in self.outputs.read().await.iter() {
            tokio::fs::write(output_dir.join(name), content).await?;
        }

        Ok(())
    }
}
