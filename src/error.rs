//! Error handling for trip-record loading operations.
//!
//! Every failure is detected eagerly and surfaced to the immediate caller.
//! No variant is ever swallowed into a partial or degraded table.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Raw data directory not found at path: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("No partition for month {month} (expected file: {path})")]
    PartitionNotFound { month: String, path: PathBuf },

    #[error(
        "Column '{column}' not found in partition {month} ({path}); missing columns: {missing:?}"
    )]
    UnknownColumn {
        column: String,
        month: String,
        path: PathBuf,
        missing: Vec<String>,
    },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("No partition files found under: {path}")]
    EmptyCatalog { path: PathBuf },

    #[error("Invalid partition pattern '{pattern}': {message}")]
    Glob { pattern: String, message: String },
}

impl LoaderError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoaderError>;
