//! Core data structures and types for trip-record loading.
//!
//! Defines month identifiers, partitions, per-call load options and the
//! batch descriptors produced by the orchestrator.

use crate::constants::{DEFAULT_CLEAN, DEFAULT_SAMPLE_RATIO};
use crate::error::LoaderError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A calendar month identifying one partition, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Create a month, rejecting out-of-range values
    pub fn new(year: i32, month: u32) -> Result<Self, LoaderError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .filter(|_| (0..=9999).contains(&year))
            .map(|date| Self {
                year: date.year(),
                month: date.month(),
            })
            .ok_or_else(|| {
                LoaderError::invalid_argument(format!("invalid month: {}-{:02}", year, month))
            })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Months since year zero, used to derive per-partition seeds
    pub fn ordinal(&self) -> u64 {
        self.year as u64 * 12 + (self.month as u64 - 1)
    }
}

impl FromStr for Month {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || LoaderError::invalid_argument(format!("month must be formatted YYYY-MM: '{}'", s));

        // Strict shape check first; chrono alone would accept "2024-1"
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        if !bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let date =
            NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").map_err(|_| invalid())?;
        Ok(Self {
            year: date.year(),
            month: date.month(),
        })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One month's on-disk data file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub month: Month,
    pub path: PathBuf,
}

/// Per-call loading options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Fraction of rows kept per partition, in `(0, 1]`
    pub sample_ratio: f64,

    /// Drop rows with non-positive distance, duration or fare
    pub clean: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sample_ratio: DEFAULT_SAMPLE_RATIO,
            clean: DEFAULT_CLEAN,
        }
    }
}

impl LoadOptions {
    pub fn with_sample_ratio(mut self, sample_ratio: f64) -> Self {
        self.sample_ratio = sample_ratio;
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }
}

/// A contiguous, non-empty group of requested months loaded together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Zero-based position of the batch in the request
    pub index: usize,
    pub months: Vec<Month>,
}
