//! Configuration for the preprocessor module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Placeholder replaced by the staged input directory.
pub const INPUT_DIR_PLACEHOLDER: &str = "{input_dir}";

/// Placeholder replaced by the output directory.
pub const OUTPUT_DIR_PLACEHOLDER: &str = "{output_dir}";

/// Configuration of the external preprocessing command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessorConfig {
    /// Executable to run.
    pub program: PathBuf,

    /// Arguments; `{input_dir}` and `{output_dir}` are substituted.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Extra environment variables for the process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl PreprocessorConfig {
    /// Creates a config for `program` with default arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: default_args(),
            env: BTreeMap::new(),
            timeout_secs: default_timeout(),
        }
    }

    /// Sets the argument template.
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

fn default_args() -> Vec<String> {
    vec![
        "--input-dir".to_string(),
        INPUT_DIR_PLACEHOLDER.to_string(),
        "--output-dir".to_string(),
        OUTPUT_DIR_PLACEHOLDER.to_string(),
    ]
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}
