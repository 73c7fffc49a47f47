//! Integration tests for the loader module
//!
//! Exercises the facade against temporary directories of real parquet
//! partitions.

pub mod error_handling;
