//! The external numerical preprocessing step.
//!
//! Preprocessing (GRIB decoding, derived field computation) is opaque to the
//! pipeline. It is reached through the `Preprocessor` trait so that tests can
//! substitute a fake that deposits controlled output files.
//!
//! `CommandPreprocessor` runs an external program with the staged input
//! directory and the output directory substituted into its arguments.

mod command;
mod config;
mod error;
mod traits;

pub use command::CommandPreprocessor;
pub use config::{PreprocessorConfig, INPUT_DIR_PLACEHOLDER, OUTPUT_DIR_PLACEHOLDER};
pub use error::PreprocessError;
pub use traits::Preprocessor;
