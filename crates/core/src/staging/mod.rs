//! Staging of window files into a scoped temporary directory.
//!
//! The `Stager` downloads every descriptor of a processing window into one
//! directory reserved for the call. The returned `StagedInputs` owns that
//! directory: dropping it removes the directory and anything left inside.

mod config;
mod error;
mod stager;

pub use config::StagingConfig;
pub use error::DownloadError;
pub use stager::{StagedInputs, Stager};
