//! TLC Loader Library
//!
//! Loads a very large monthly-partitioned NYC TLC trip-record dataset into a
//! single in-memory polars table, for analysis code that should not have to
//! deal with file discovery, schema drift or memory limits itself.
//!
//! This library provides tools for:
//! - Resolving month identifiers to partition files and listing the catalog
//! - Validating requested columns against each partition's own schema
//! - Reconciling timestamp precision across partitions
//! - Filtering invalid trips and uniformly sampling rows per partition
//! - Loading months in memory-bounded batches with identical results to a
//!   single-pass load
//!
//! ```no_run
//! use tlc_loader::{LoadOptions, TlcDataLoader};
//!
//! let loader = TlcDataLoader::new("data/raw")?;
//! let df = loader.load_in_batches(
//!     &["pickup_datetime", "PULocationID", "trip_miles", "base_passenger_fare"],
//!     &["2024-01", "2024-02", "2024-03"],
//!     2,
//!     LoadOptions::default().with_sample_ratio(0.1),
//! )?;
//! println!("{} rows", df.height());
//! # Ok::<(), tlc_loader::LoaderError>(())
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod schema;

// Re-export commonly used types
pub use config::{LoaderConfig, ValidityFilterConfig};
pub use error::{LoaderError, Result};
pub use loader::TlcDataLoader;
pub use loader::batch::BatchIter;
pub use models::{LoadOptions, Month};
