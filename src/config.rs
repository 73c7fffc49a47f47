//! Loader configuration.
//!
//! All configuration is explicit: a [`LoaderConfig`] is attached to a loader
//! at construction and every default is enumerated in
//! [`crate::constants`]. Nothing is read from the environment.

use crate::constants::{
    DEFAULT_FILE_EXTENSION, DEFAULT_FILE_PREFIX, DEFAULT_MEMORY_THRESHOLD, DEFAULT_SAMPLE_SEED,
    columns,
};
use crate::error::{LoaderError, Result};
use serde::{Deserialize, Serialize};

/// Column names recognised by the validity filter
///
/// A row is valid when every recognised column present in the projection is
/// strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidityFilterConfig {
    /// Columns holding trip distance
    pub distance_columns: Vec<String>,

    /// Columns holding trip duration
    pub duration_columns: Vec<String>,

    /// Columns holding the fare
    pub fare_columns: Vec<String>,
}

impl Default for ValidityFilterConfig {
    fn default() -> Self {
        Self {
            distance_columns: vec![
                columns::TRIP_MILES.to_string(),
                columns::TRIP_DISTANCE.to_string(),
            ],
            duration_columns: vec![
                columns::TRIP_TIME.to_string(),
                columns::TRIP_DURATION.to_string(),
            ],
            fare_columns: vec![
                columns::BASE_PASSENGER_FARE.to_string(),
                columns::FARE.to_string(),
            ],
        }
    }
}

impl ValidityFilterConfig {
    /// Columns of `projection` the filter applies to, in projection order
    pub fn filtered_columns<'a>(&self, projection: &'a [String]) -> Vec<&'a str> {
        projection
            .iter()
            .filter(|name| {
                self.distance_columns.contains(name)
                    || self.duration_columns.contains(name)
                    || self.fare_columns.contains(name)
            })
            .map(String::as_str)
            .collect()
    }
}

/// Configuration for a [`crate::TlcDataLoader`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Partition file name prefix, e.g. `fhvhv_tripdata`
    pub file_prefix: String,

    /// Partition file extension without the dot
    pub file_extension: String,

    /// Base seed for per-partition sampling; `None` draws fresh randomness
    pub sample_seed: Option<u64>,

    /// Columns the validity filter applies to
    pub validity_filter: ValidityFilterConfig,

    /// System memory fraction above which a warning is logged between batches
    pub memory_threshold: f64,

    /// Let polars evaluate partition scans with its thread pool
    pub parallel_scan: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            sample_seed: Some(DEFAULT_SAMPLE_SEED),
            validity_filter: ValidityFilterConfig::default(),
            memory_threshold: DEFAULT_MEMORY_THRESHOLD,
            parallel_scan: true,
        }
    }
}

impl LoaderConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.file_prefix.is_empty() {
            return Err(LoaderError::invalid_argument("file_prefix must not be empty"));
        }
        if self.file_extension.is_empty() || self.file_extension.starts_with('.') {
            return Err(LoaderError::invalid_argument(
                "file_extension must be non-empty and given without a leading dot",
            ));
        }
        if !(self.memory_threshold > 0.0 && self.memory_threshold <= 1.0) {
            return Err(LoaderError::invalid_argument(format!(
                "memory_threshold must be in (0, 1], got {}",
                self.memory_threshold
            )));
        }
        Ok(())
    }
}
