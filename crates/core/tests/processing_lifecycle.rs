//! Processing lifecycle integration tests.
//!
//! These tests drive `Processing` with mock collaborators:
//! - Window validation before any side effect
//! - Upload of exactly the artifact of the target lead time
//! - Cleanup of scratch directories on success and failure
//! - Completion marking only after a successful upload
//! - At-least-once behaviour when a batch is retried

use std::path::Path;

use tempfile::TempDir;

use flexprep_core::{
    completion::{CompletionError, CompletionStore, SqliteCompletionStore},
    forecast::SelectionError,
    preprocessor::PreprocessError,
    processor::{Processing, ProcessingError, ProcessingState},
    staging::{DownloadError, StagingConfig},
    storage::{FsObjectStore, FsStoreConfig, StorageError},
    testing::{fixtures, MockCompletionStore, MockObjectStore, MockPreprocessor},
};

/// Test helper wiring a pipeline to mocks and a scratch work directory.
struct TestHarness {
    processing: Processing<MockObjectStore, MockPreprocessor, MockCompletionStore>,
    store: MockObjectStore,
    preprocessor: MockPreprocessor,
    completion: MockCompletionStore,
    work_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let work_dir = TempDir::new().expect("Failed to create work dir");
        let store = MockObjectStore::new();
        let preprocessor = MockPreprocessor::new();
        let completion = MockCompletionStore::new();

        let processing = Processing::new(
            StagingConfig::with_work_dir(work_dir.path()),
            store.clone(),
            preprocessor.clone(),
            completion.clone(),
        );

        Self {
            processing,
            store,
            preprocessor,
            completion,
            work_dir,
        }
    }

    /// Number of entries left in the work directory.
    fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.work_dir.path())
            .expect("Failed to read work dir")
            .count()
    }
}

fn assert_removed(path: &Path) {
    assert!(!path.exists(), "{} should have been removed", path.display());
}

#[tokio::test]
async fn test_small_batches_fail_validation_without_side_effects() {
    for steps in [&[][..], &[6][..], &[3, 6][..]] {
        let h = TestHarness::new();
        let batch = fixtures::batch(steps);
        h.store.put_batch(&batch).await;

        let result = h.processing.process(batch).await;

        assert!(matches!(
            result,
            Err(ProcessingError::Selection(SelectionError::NotEnoughFiles { .. }))
        ));
        assert_eq!(h.store.download_count().await, 0);
        assert_eq!(h.preprocessor.run_count().await, 0);
        assert_eq!(h.store.upload_count().await, 0);
        assert_eq!(h.completion.mark_count(), 0);
        assert_eq!(h.processing.state().await, ProcessingState::Failed);
        assert_eq!(h.scratch_entries(), 0);
    }
}

#[tokio::test]
async fn test_uploads_only_target_artifact_and_marks_target_row() {
    let h = TestHarness::new();
    // Input order deliberately differs from step order.
    let batch = fixtures::batch(&[3, 6, 0]);
    h.store.put_batch(&batch).await;
    h.preprocessor.add_output("dispf2024030106", b"step 6").await;
    h.preprocessor.add_output("dispf2024030112", b"step 12").await;
    h.preprocessor.add_output("notes.txt", b"log").await;

    let report = h.processing.process(batch.clone()).await.unwrap();

    assert_eq!(report.row_id, batch[1].row_id);
    assert_eq!(report.step, 6);
    assert_eq!(report.lead_time.to_string(), "2024-03-01 06:00:00");
    assert_eq!(report.artifact.key, "dispf2024030106");
    assert_eq!(report.artifact.size_bytes, 6);
    assert_eq!(report.staged_files, 3);
    assert!(report.missing_inputs.is_empty());

    let uploads = h.store.recorded_uploads().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].key, "dispf2024030106");
    assert_eq!(uploads[0].content, b"step 6");

    assert_eq!(h.completion.recorded_marks(), vec![batch[1].row_id.clone()]);
    assert_eq!(h.processing.state().await, ProcessingState::Idle);
}

#[tokio::test]
async fn test_stages_window_in_step_order_into_one_directory() {
    let h = TestHarness::new();
    let batch = fixtures::batch(&[0, 3, 6, 9, 12]);
    h.store.put_batch(&batch).await;
    h.preprocessor.add_output("dispf2024030112", b"x").await;

    h.processing.process(batch.clone()).await.unwrap();

    // target, previous, two initializers; step 0 is outside the window
    let mut expected: Vec<String> = [4, 3, 2, 1].iter().map(|i| batch[*i].key.clone()).collect();
    expected.sort();
    let mut downloaded = h.store.recorded_downloads().await;
    downloaded.sort();
    assert_eq!(downloaded, expected);

    let runs = h.preprocessor.recorded_runs().await;
    assert_eq!(runs.len(), 1);
    let mut staged_names: Vec<String> = [4, 3, 2, 1]
        .iter()
        .map(|i| batch[*i].file_name().to_string())
        .collect();
    staged_names.sort();
    assert_eq!(runs[0].input_files, staged_names);
}

#[tokio::test]
async fn test_scratch_directories_removed_after_success() {
    let h = TestHarness::new();
    let batch = fixtures::batch(&[0, 3, 6]);
    h.store.put_batch(&batch).await;
    h.preprocessor.add_output("dispf2024030106", b"x").await;

    h.processing.process(batch).await.unwrap();

    let run = &h.preprocessor.recorded_runs().await[0];
    assert_removed(&run.input_dir);
    assert_removed(&run.output_dir);
    assert_eq!(h.scratch_entries(), 0);
}

#[tokio::test]
async fn test_preprocessing_failure_skips_upload_and_completion() {
    let h = TestHarness::new();
    let batch = fixtures::batch(&[0, 3, 6]);
    h.store.put_batch(&batch).await;
    h.preprocessor.add_output("dispf2024030106", b"x").await;
    h.preprocessor
        .set_next_error(PreprocessError::failed("grib decoding failed", None))
        .await;

    let result = h.processing.process(batch).await;

    assert!(matches!(
        result,
        Err(ProcessingError::Preprocess(PreprocessError::Failed { .. }))
    ));
    assert_eq!(h.store.upload_count().await, 0);
    assert_eq!(h.completion.mark_count(), 0);

    let run = &h.preprocessor.recorded_runs().await[0];
    assert_removed(&run.output_dir);
    assert_removed(&run.input_dir);
    assert_eq!(h.processing.state().await, ProcessingState::Failed);
}

#[tokio::test]
async fn test_download_failure_propagates_original_error() {
    let h = TestHarness::new();
    let batch = fixtures::batch(&[0, 3, 6]);
    h.store.put_batch(&batch).await;
    h.store
        .set_next_download_error(StorageError::Status {
            key: "any".to_string(),
            status: 503,
        })
        .await;

    let result = h.processing.process(batch).await;

    match result {
        Err(ProcessingError::Download(DownloadError::Transfer { source, .. })) => {
            assert!(matches!(source, StorageError::Status { status: 503, .. }));
        }
        other => panic!("expected download failure, got {:?}", other),
    }
    assert_eq!(h.preprocessor.run_count().await, 0);
    assert_eq!(h.store.upload_count().await, 0);
    assert_eq!(h.completion.mark_count(), 0);
    assert_eq!(h.scratch_entries(), 0);
}

#[tokio::test]
async fn test_window_with_colliding_file_names_is_rejected() {
    let h = TestHarness::new();
    let mut batch = fixtures::batch(&[0, 3, 6]);
    for descriptor in &mut batch {
        descriptor.key = format!("ifs/{:03}/data.grib", descriptor.step);
    }
    h.store.put_batch(&batch).await;
    h.preprocessor.add_output("dispf2024030106", b"x").await;

    let result = h.processing.process(batch).await;

    assert!(matches!(
        result,
        Err(ProcessingError::Download(DownloadError::DuplicateName { ref name, .. }))
            if name == "data.grib"
    ));
    assert_eq!(h.store.download_count().await, 0);
    assert_eq!(h.preprocessor.run_count().await, 0);
    assert_eq!(h.store.upload_count().await, 0);
    assert_eq!(h.completion.mark_count(), 0);
    assert_eq!(h.scratch_entries(), 0);
}

#[tokio::test]
async fn test_missing_target_artifact_leaves_row_unmarked() {
    let h = TestHarness::new();
    let batch = fixtures::batch(&[0, 3, 6]);
    h.store.put_batch(&batch).await;
    h.preprocessor.add_output("dispf2024030112", b"x").await;

    let result = h.processing.process(batch).await;

    assert!(matches!(
        result,
        Err(ProcessingError::OutputMissing { expected }) if expected == "dispf2024030106"
    ));
    assert_eq!(h.store.upload_count().await, 0);
    assert_eq!(h.completion.mark_count(), 0);
    assert_eq!(h.scratch_entries(), 0);
}

#[tokio::test]
async fn test_upload_failure_leaves_row_unmarked() {
    let h = TestHarness::new();
    let batch = fixtures::batch(&[0, 3, 6]);
    h.store.put_batch(&batch).await;
    h.preprocessor.add_output("dispf2024030106", b"x").await;
    h.store
        .set_next_upload_error(StorageError::Status {
            key: "dispf2024030106".to_string(),
            status: 500,
        })
        .await;

    let result = h.processing.process(batch).await;

    assert!(matches!(
        result,
        Err(ProcessingError::Upload { ref key, .. }) if key == "dispf2024030106"
    ));
    assert_eq!(h.completion.mark_count(), 0);
    assert_eq!(h.scratch_entries(), 0);
}

#[tokio::test]
async fn test_missing_staged_file_at_cleanup_is_a_warning() {
    let h = TestHarness::new();
    let batch = fixtures::batch(&[0, 3, 6]);
    h.store.put_batch(&batch).await;
    h.preprocessor.add_output("dispf2024030106", b"x").await;
    h.preprocessor
        .remove_input_during_run(batch[0].file_name())
        .await;

    let report = h.processing.process(batch.clone()).await.unwrap();

    assert_eq!(report.missing_inputs.len(), 1);
    assert_eq!(
        report.missing_inputs[0].file_name().unwrap(),
        batch[0].file_name()
    );
    assert_eq!(h.completion.mark_count(), 1);
    assert_removed(&h.preprocessor.recorded_runs().await[0].input_dir);
}

#[tokio::test]
async fn test_retry_after_completion_failure_reuploads_and_marks() {
    let h = TestHarness::new();
    let batch = fixtures::batch(&[0, 3, 6]);
    h.store.put_batch(&batch).await;
    h.preprocessor.add_output("dispf2024030106", b"artifact").await;
    h.completion
        .set_next_error(CompletionError::Database("database is locked".to_string()));

    let first = h.processing.process(batch.clone()).await;
    assert!(matches!(
        first,
        Err(ProcessingError::Completion(CompletionError::Database(_)))
    ));
    assert_eq!(h.store.upload_count().await, 1);
    assert_eq!(h.completion.mark_count(), 0);

    let second = h.processing.process(batch.clone()).await.unwrap();
    assert_eq!(second.artifact.key, "dispf2024030106");

    let uploads = h.store.recorded_uploads().await;
    assert_eq!(uploads.len(), 2);
    assert!(uploads.iter().all(|u| u.key == "dispf2024030106"));
    assert_eq!(uploads[0].content, uploads[1].content);
    assert_eq!(h.completion.recorded_marks(), vec![batch[2].row_id.clone()]);
}

#[tokio::test]
async fn test_filesystem_store_and_sqlite_completion_end_to_end() {
    let root = TempDir::new().unwrap();
    let input_root = root.path().join("input");
    let output_root = root.path().join("output");
    let work_dir = root.path().join("work");

    let completion =
        std::sync::Arc::new(SqliteCompletionStore::new(&root.path().join("flexprep.db")).unwrap());
    let batch = fixtures::batch(&[0, 3, 6, 9]);
    for descriptor in &batch {
        let path = input_root.join(&descriptor.key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, descriptor.key.as_bytes()).unwrap();
        completion.register(descriptor).unwrap();
    }

    let preprocessor = MockPreprocessor::new();
    preprocessor.add_output("dispf2024030109", b"flexpart input").await;
    let processing = Processing::new(
        StagingConfig::with_work_dir(&work_dir),
        FsObjectStore::new(FsStoreConfig {
            input_root,
            output_root: output_root.clone(),
        }),
        preprocessor,
        std::sync::Arc::clone(&completion),
    );

    let run = completion.list_run(fixtures::ref_time()).unwrap();
    let report = processing.process(run).await.unwrap();

    assert_eq!(report.artifact.key, "dispf2024030109");
    assert_eq!(
        std::fs::read(output_root.join("dispf2024030109")).unwrap(),
        b"flexpart input"
    );
    assert!(completion.get(&batch[3].row_id).unwrap().unwrap().processed);
    for descriptor in &batch[..3] {
        assert!(!completion.get(&descriptor.row_id).unwrap().unwrap().processed);
    }
    assert_eq!(std::fs::read_dir(&work_dir).unwrap().count(), 0);
}
