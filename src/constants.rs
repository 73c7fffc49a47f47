//! Application constants for the TLC loader
//!
//! Default values and column names used throughout the loader. Every default
//! here is surfaced through [`crate::config::LoaderConfig`] or
//! [`crate::models::LoadOptions`] rather than read as ambient state.

use polars::prelude::TimeUnit;

// =============================================================================
// Partition Naming
// =============================================================================

/// File name prefix of the high volume FHV monthly partitions
pub const DEFAULT_FILE_PREFIX: &str = "fhvhv_tripdata";

/// Columnar file extension of the monthly partitions
pub const DEFAULT_FILE_EXTENSION: &str = "parquet";

/// Default raw data directory used by the CLI when `--root` is omitted
pub const DEFAULT_RAW_DATA_DIR: &str = "data/raw";

// =============================================================================
// Loading Defaults
// =============================================================================

/// Months loaded together per batch
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Fraction of rows kept per partition
pub const DEFAULT_SAMPLE_RATIO: f64 = 1.0;

/// Apply the validity filter unless told otherwise
pub const DEFAULT_CLEAN: bool = true;

/// Base seed for per-partition sampling
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

/// System memory fraction above which a warning is logged between batches
pub const DEFAULT_MEMORY_THRESHOLD: f64 = 0.8;

/// Every timestamp column is coerced to this resolution
pub const CANONICAL_TIME_UNIT: TimeUnit = TimeUnit::Microseconds;

// =============================================================================
// Column Names
// =============================================================================

/// Trip record column names recognised by the validity filter
pub mod columns {
    // Raw HVFHV names
    pub const TRIP_MILES: &str = "trip_miles";
    pub const TRIP_TIME: &str = "trip_time";
    pub const BASE_PASSENGER_FARE: &str = "base_passenger_fare";

    // Analysis-facing names
    pub const TRIP_DISTANCE: &str = "trip_distance";
    pub const TRIP_DURATION: &str = "trip_duration";
    pub const FARE: &str = "fare";
}

/// Expected file name for a month partition
pub fn partition_file_name(prefix: &str, month: &str, extension: &str) -> String {
    format!("{}_{}.{}", prefix, month, extension)
}
