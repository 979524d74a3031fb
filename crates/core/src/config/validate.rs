use super::{types::Config, ConfigError};
use crate::storage::StorageBackend;

/// Validate configuration
/// Currently validates:
/// - The selected storage backend has its section
/// - The preprocessor program is set and has a non-zero timeout
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    match config.storage.backend {
        StorageBackend::Http => {
            let http = config.storage.http.as_ref().ok_or_else(|| {
                ConfigError::ValidationError(
                    "storage.http is required when storage.backend = \"http\"".to_string(),
                )
            })?;
            for (name, bucket) in [("input", &http.input), ("output", &http.output)] {
                if bucket.endpoint_url.is_empty() || bucket.name.is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "storage.http.{} needs endpoint_url and name",
                        name
                    )));
                }
            }
            if http.timeout_secs == 0 {
                return Err(ConfigError::ValidationError(
                    "storage.http.timeout_secs cannot be 0".to_string(),
                ));
            }
        }
        StorageBackend::Filesystem => {
            if config.storage.filesystem.is_none() {
                return Err(ConfigError::ValidationError(
                    "storage.filesystem is required when storage.backend = \"filesystem\""
                        .to_string(),
                ));
            }
        }
    }

    if config.preprocessor.program.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "preprocessor.program cannot be empty".to_string(),
        ));
    }

    if config.preprocessor.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "preprocessor.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
