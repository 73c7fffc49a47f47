//! Argument validation for load calls.
//!
//! Everything here runs before the filesystem is touched, so malformed
//! requests fail without any I/O.

use crate::error::{LoaderError, Result};
use crate::models::{LoadOptions, Month};
use std::collections::HashSet;

/// A validated feature/month request
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub features: Vec<String>,
    pub months: Vec<Month>,
    pub options: LoadOptions,
}

impl LoadRequest {
    /// Validate caller arguments into a request
    pub fn new<F, M>(features: &[F], months: &[M], options: LoadOptions) -> Result<Self>
    where
        F: AsRef<str>,
        M: AsRef<str>,
    {
        validate_sample_ratio(options.sample_ratio)?;
        let features = validate_features(features)?;
        let months = parse_months(months)?;

        Ok(Self {
            features,
            months,
            options,
        })
    }
}

/// Features must be non-empty and unique
pub fn validate_features<F: AsRef<str>>(features: &[F]) -> Result<Vec<String>> {
    if features.is_empty() {
        return Err(LoaderError::invalid_argument(
            "at least one feature must be requested",
        ));
    }

    let mut seen = HashSet::new();
    let mut validated = Vec::with_capacity(features.len());
    for feature in features {
        let feature = feature.as_ref();
        if feature.is_empty() {
            return Err(LoaderError::invalid_argument("feature names must not be empty"));
        }
        if !seen.insert(feature) {
            return Err(LoaderError::invalid_argument(format!(
                "feature '{}' requested more than once",
                feature
            )));
        }
        validated.push(feature.to_string());
    }

    Ok(validated)
}

/// Months must be non-empty, well-formed `YYYY-MM` and unique
pub fn parse_months<M: AsRef<str>>(months: &[M]) -> Result<Vec<Month>> {
    if months.is_empty() {
        return Err(LoaderError::invalid_argument(
            "at least one month must be requested",
        ));
    }

    let mut seen = HashSet::new();
    let mut parsed = Vec::with_capacity(months.len());
    for month in months {
        let month: Month = month.as_ref().trim().parse()?;
        if !seen.insert(month) {
            return Err(LoaderError::invalid_argument(format!(
                "month {} requested more than once",
                month
            )));
        }
        parsed.push(month);
    }

    Ok(parsed)
}

/// Sample ratio must lie in `(0, 1]`
pub fn validate_sample_ratio(sample_ratio: f64) -> Result<()> {
    // NaN fails both comparisons
    if sample_ratio > 0.0 && sample_ratio <= 1.0 {
        Ok(())
    } else {
        Err(LoaderError::invalid_argument(format!(
            "sample_ratio must be in (0, 1], got {}",
            sample_ratio
        )))
    }
}

/// Batch size must be at least one month
pub fn validate_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(LoaderError::invalid_argument(
            "batch_size must be a positive number of months",
        ));
    }
    Ok(())
}
