//! Processor module: one preprocessing step for one batch.
//!
//! `Processing` composes the other modules:
//!
//! 1. select the processing window (`forecast::select`)
//! 2. stage the window files (`staging::Stager`)
//! 3. run the preprocessor into a scoped output directory
//! 4. upload the artifact of the target lead time (`dispf<YYYYMMDDHH>`)
//! 5. delete the staged inputs
//! 6. mark the target row as processed (`completion::CompletionStore`)
//!
//! # Example
//!
//! ```ignore
//! use flexprep_core::processor::Processing;
//! use flexprep_core::staging::StagingConfig;
//!
//! let processing = Processing::new(StagingConfig::default(), store, preprocessor, completion);
//! let report = processing.process(batch).await?;
//! println!("Uploaded {} ({} bytes)", report.artifact.key, report.artifact.size_bytes);
//! ```

mod error;
mod pipeline;
mod types;

pub use error::ProcessingError;
pub use pipeline::Processing;
pub use types::{ProcessingReport, ProcessingState};
