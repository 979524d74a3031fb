pub mod completion;
pub mod config;
pub mod forecast;
pub mod metrics;
pub mod preprocessor;
pub mod processor;
pub mod staging;
pub mod storage;
pub mod testing;

pub use completion::{CompletionError, CompletionRecord, CompletionStore, SqliteCompletionStore};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LogFormat,
};
pub use forecast::{
    expected_output_filename, select, FileDescriptor, ProcessingWindow, SelectionError,
};
pub use preprocessor::{CommandPreprocessor, PreprocessError, Preprocessor, PreprocessorConfig};
pub use processor::{Processing, ProcessingError, ProcessingReport, ProcessingState};
pub use staging::{DownloadError, StagedInputs, Stager, StagingConfig};
pub use storage::{
    FsObjectStore, HttpObjectStore, ObjectStore, StorageBackend, StorageConfig, StorageError,
    UploadReceipt,
};
