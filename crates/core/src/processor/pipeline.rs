//! Processing pipeline implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::completion::CompletionStore;
use crate::forecast::{expected_output_filename, select, FileDescriptor};
use crate::metrics;
use crate::preprocessor::Preprocessor;
use crate::staging::{StagedInputs, Stager, StagingConfig};
use crate::storage::ObjectStore;

use super::error::ProcessingError;
use super::types::{ProcessingReport, ProcessingState};

/// Prefix of temporary output directories.
const OUTPUT_DIR_PREFIX: &str = "flexprep-output-";

/// Runs one preprocessing step for a batch of forecast files.
///
/// The pipeline selects the processing window, stages it, runs the
/// preprocessor once, uploads the artifact of the target timestep and marks
/// the target row as processed. Both scratch directories are removed on
/// every exit path.
///
/// Processing is at-least-once: if marking fails after the upload, retrying
/// the batch uploads the same artifact again before marking the row.
pub struct Processing<S: ObjectStore, P: Preprocessor, C: CompletionStore> {
    staging: StagingConfig,
    store: Arc<S>,
    stager: Stager<S>,
    preprocessor: P,
    completion: C,
    state: RwLock<ProcessingState>,
}

impl<S: ObjectStore, P: Preprocessor, C: CompletionStore> Processing<S, P, C> {
    /// Creates a new pipeline.
    pub fn new(staging: StagingConfig, store: S, preprocessor: P, completion: C) -> Self {
        let store = Arc::new(store);
        Self {
            stager: Stager::new(Arc::clone(&store), staging.clone()),
            staging,
            store,
            preprocessor,
            completion,
            state: RwLock::new(ProcessingState::Idle),
        }
    }

    /// State of the most recent invocation.
    pub async fn state(&self) -> ProcessingState {
        *self.state.read().await
    }

    /// Processes the most recent timestep of `batch`.
    ///
    /// All failures propagate unchanged; nothing is retried here.
    pub async fn process(
        &self,
        batch: Vec<FileDescriptor>,
    ) -> Result<ProcessingReport, ProcessingError> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("process", run_id = %run_id);
        let start = Instant::now();

        let result = self.run(run_id, batch, start).instrument(span).await;

        let label = match &result {
            Ok(_) => {
                self.transition(ProcessingState::Idle).await;
                "success"
            }
            Err(e) => {
                self.transition(ProcessingState::Failed).await;
                e.phase()
            }
        };
        metrics::BATCHES_TOTAL.with_label_values(&[label]).inc();
        metrics::BATCH_DURATION
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn run(
        &self,
        run_id: String,
        batch: Vec<FileDescriptor>,
        start: Instant,
    ) -> Result<ProcessingReport, ProcessingError> {
        if let Some(target) = batch.iter().max_by_key(|d| d.step) {
            info!(step = target.step, files = batch.len(), "Processing timestep");
        }

        // Selection and staging: a batch that cannot form a window never
        // reaches the preprocessor.
        self.transition(ProcessingState::Selecting).await;
        let window = select(batch).inspect_err(|e| {
            error!(error = %e, "Failed to sort and download files");
        })?;
        let target = window.target.clone();
        let lead_time = target.lead_time()?;
        let expected = expected_output_filename(&target)?;

        self.transition(ProcessingState::Staging).await;
        let staged = self
            .stager
            .stage(&window.descriptors())
            .await
            .inspect_err(|e| {
                error!(error = %e, "Failed to sort and download files");
            })?;

        let output_dir = self
            .staging
            .tempdir(OUTPUT_DIR_PREFIX)
            .map_err(ProcessingError::Workspace)?;

        self.transition(ProcessingState::Preprocessing).await;
        let preprocessing_start = Instant::now();
        self.preprocessor
            .run(staged.dir(), output_dir.path())
            .await?;
        let preprocessing_duration_ms = preprocessing_start.elapsed().as_millis() as u64;

        self.transition(ProcessingState::Publishing).await;
        let artifact_path = find_artifact(output_dir.path(), &expected).await?;
        let artifact = self
            .store
            .upload(&artifact_path, &expected)
            .await
            .map_err(|e| ProcessingError::Upload {
                key: expected.clone(),
                source: e,
            })?;
        drop(output_dir);
        metrics::ARTIFACTS_UPLOADED.inc();
        metrics::BYTES_UPLOADED.inc_by(artifact.size_bytes);
        info!(key = %artifact.key, size_bytes = artifact.size_bytes, "Uploaded artifact");

        let staged_files = staged.paths().len();
        let missing_inputs = remove_staged(&staged).await?;
        drop(staged);

        self.transition(ProcessingState::Completing).await;
        self.completion.mark_processed(&target.row_id)?;
        info!(row_id = %target.row_id, "Marked row as processed");

        Ok(ProcessingReport {
            run_id,
            row_id: target.row_id,
            step: target.step,
            lead_time,
            artifact,
            staged_files,
            missing_inputs,
            preprocessing_duration_ms,
            total_duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn transition(&self, next: ProcessingState) {
        let mut state = self.state.write().await;
        debug!(from = %*state, to = %next, "State transition");
        *state = next;
    }
}

/// Finds the regular file named `expected` in the output directory.
///
/// Other entries are artifacts for other lead times and are ignored.
async fn find_artifact(output_dir: &Path, expected: &str) -> Result<PathBuf, ProcessingError> {
    let scan_error = |e| ProcessingError::OutputScan {
        path: output_dir.to_path_buf(),
        source: e,
    };

    let mut entries = tokio::fs::read_dir(output_dir).await.map_err(scan_error)?;
    while let Some(entry) = entries.next_entry().await.map_err(scan_error)? {
        if entry.file_name() != expected {
            debug!(file = %entry.file_name().to_string_lossy(), "Skipping unrelated output");
            continue;
        }
        if entry.file_type().await.map_err(scan_error)?.is_file() {
            return Ok(entry.path());
        }
    }

    Err(ProcessingError::OutputMissing {
        expected: expected.to_string(),
    })
}

/// Deletes every staged input, returning the files that were already gone.
async fn remove_staged(staged: &StagedInputs) -> Result<Vec<PathBuf>, ProcessingError> {
    let mut missing = Vec::new();
    for path in staged.paths() {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Tried to delete missing file");
                metrics::STAGED_FILES_MISSING.inc();
                missing.push(path.clone());
            }
            Err(e) => {
                return Err(ProcessingError::Cleanup {
                    path: path.clone(),
                    source: e,
                })
            }
        }
    }
    Ok(missing)
}
