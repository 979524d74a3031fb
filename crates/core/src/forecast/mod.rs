//! Forecast file descriptors and processing window selection.
//!
//! A batch contains descriptors of the input files of one forecast run. The
//! selector orders them by lead step and picks the window needed to produce
//! the most recent timestep:
//!
//! - `target`: the file with the largest step (the timestep being produced)
//! - `previous`: the file with the second-largest step
//! - `initializers`: the next one or two files, used for model initialization
//!
//! # Example
//!
//! ```ignore
//! use flexprep_core::forecast::{select, expected_output_filename};
//!
//! let window = select(batch)?;
//! let filename = expected_output_filename(&window.target)?;
//! assert!(filename.starts_with("dispf"));
//! ```

mod error;
mod selector;
mod types;

pub use error::SelectionError;
pub use selector::{select, MIN_BATCH_SIZE, WINDOW_SIZE};
pub use types::{
    expected_output_filename, FileDescriptor, ProcessingWindow, OUTPUT_PREFIX,
    OUTPUT_TIME_FORMAT,
};
