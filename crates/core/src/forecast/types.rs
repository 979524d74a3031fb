//! Types for forecast file descriptors.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::SelectionError;

/// Prefix of every artifact written by the preprocessor.
pub const OUTPUT_PREFIX: &str = "dispf";

/// `strftime` format of the lead time suffix of an artifact name.
pub const OUTPUT_TIME_FORMAT: &str = "%Y%m%d%H";

/// One candidate input file of a forecast run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Row identifier in the completion store.
    #[serde(deserialize_with = "deserialize_row_id")]
    pub row_id: String,
    /// Reference (analysis) time of the run.
    pub forecast_ref_time: NaiveDateTime,
    /// Forecast lead step in hours.
    #[serde(deserialize_with = "deserialize_step")]
    pub step: u32,
    /// Object key of the remote input file.
    pub key: String,
}

impl FileDescriptor {
    /// Creates a new descriptor.
    pub fn new(
        row_id: impl Into<String>,
        forecast_ref_time: NaiveDateTime,
        step: u32,
        key: impl Into<String>,
    ) -> Self {
        Self {
            row_id: row_id.into(),
            forecast_ref_time,
            step,
            key: key.into(),
        }
    }

    /// Calendar instant described by this file: reference time plus `step` hours.
    pub fn lead_time(&self) -> Result<NaiveDateTime, SelectionError> {
        Duration::try_hours(i64::from(self.step))
            .and_then(|offset| self.forecast_ref_time.checked_add_signed(offset))
            .ok_or(SelectionError::LeadTimeOutOfRange {
                forecast_ref_time: self.forecast_ref_time,
                step: self.step,
            })
    }

    /// Base name of the object key, used as the staged file name.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

/// Name of the artifact the preprocessor writes for the given descriptor.
///
/// `dispf` followed by the lead time as `YYYYMMDDHH`.
pub fn expected_output_filename(descriptor: &FileDescriptor) -> Result<String, SelectionError> {
    let lead_time = descriptor.lead_time()?;
    Ok(format!(
        "{}{}",
        OUTPUT_PREFIX,
        lead_time.format(OUTPUT_TIME_FORMAT)
    ))
}

/// The subset of a batch handed to one preprocessing invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingWindow {
    /// Descriptor with the largest step.
    pub target: FileDescriptor,
    /// Descriptor with the second-largest step.
    pub previous: FileDescriptor,
    /// Third- and fourth-largest steps (one entry for a batch of three).
    pub initializers: Vec<FileDescriptor>,
}

impl ProcessingWindow {
    /// All descriptors in download order: target, previous, initializers.
    pub fn descriptors(&self) -> Vec<FileDescriptor> {
        let mut files = Vec::with_capacity(2 + self.initializers.len());
        files.push(self.target.clone());
        files.push(self.previous.clone());
        files.extend(self.initializers.iter().cloned());
        files
    }

    /// Number of files in the window.
    pub fn len(&self) -> usize {
        2 + self.initializers.len()
    }

    /// A window always holds at least a target and its predecessor.
    pub fn is_empty(&self) -> bool {
        false
    }
}

fn deserialize_step<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawStep {
        Number(u32),
        Text(String),
    }

    match RawStep::deserialize(deserializer)? {
        RawStep::Number(step) => Ok(step),
        RawStep::Text(text) => text
            .trim()
            .parse::<u32>()
            .map_err(|e| serde::de::Error::custom(format!("invalid step {:?}: {}", text, e))),
    }
}

fn deserialize_row_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRowId {
        Number(i64),
        Text(String),
    }

    Ok(match RawRowId::deserialize(deserializer)? {
        RawRowId::Number(id) => id.to_string(),
        RawRowId::Text(id) => id,
    })
}
