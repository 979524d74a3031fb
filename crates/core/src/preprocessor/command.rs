//! Preprocessor backed by an external executable.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::config::{PreprocessorConfig, INPUT_DIR_PLACEHOLDER, OUTPUT_DIR_PLACEHOLDER};
use super::error::PreprocessError;
use super::traits::Preprocessor;

/// Runs the configured preprocessing program once per invocation.
pub struct CommandPreprocessor {
    config: PreprocessorConfig,
}

impl CommandPreprocessor {
    /// Creates a new command preprocessor with the given configuration.
    pub fn new(config: PreprocessorConfig) -> Self {
        Self { config }
    }

    /// Substitutes directory placeholders in the argument template.
    fn build_args(&self, input_dir: &Path, output_dir: &Path) -> Vec<String> {
        let input = input_dir.to_string_lossy();
        let output = output_dir.to_string_lossy();
        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_DIR_PLACEHOLDER, &input)
                    .replace(OUTPUT_DIR_PLACEHOLDER, &output)
            })
            .collect()
    }
}

#[async_trait]
impl Preprocessor for CommandPreprocessor {
    fn name(&self) -> &str {
        "command"
    }

    async fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<(), PreprocessError> {
        let args = self.build_args(input_dir, output_dir);
        debug!(program = %self.config.program.display(), ?args, "Starting preprocessor");

        let start = Instant::now();
        let output = Command::new(&self.config.program)
            .args(&args)
            .envs(&self.config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match timeout(Duration::from_secs(self.config.timeout_secs), output).await {
            Ok(result) => result.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PreprocessError::ProgramNotFound {
                        path: self.config.program.clone(),
                    }
                } else {
                    PreprocessError::Io(e)
                }
            })?,
            Err(_) => {
                warn!(timeout_secs = self.config.timeout_secs, "Preprocessor timed out");
                return Err(PreprocessError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(PreprocessError::failed(
                format!("preprocessor exited with {}", output.status),
                (!stderr.is_empty()).then_some(stderr),
            ));
        }

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Preprocessor finished"
        );
        Ok(())
    }
}
