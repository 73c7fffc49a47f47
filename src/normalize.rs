//! Timestamp precision normalization.
//!
//! Monthly partitions encode pickup/dropoff timestamps at different
//! resolutions (nanoseconds in some months, microseconds in others).
//! Frames with mismatched resolutions cannot be concatenated, so every
//! per-partition frame is coerced to [`CANONICAL_TIME_UNIT`] first. Time
//! zones are preserved. Normalizing a canonical frame is a no-op.

use crate::constants::CANONICAL_TIME_UNIT;
use polars::prelude::*;
use tracing::debug;

/// Cast expressions for every datetime column of `schema` not already at the
/// canonical resolution
pub fn normalization_casts(schema: &Schema) -> Vec<Expr> {
    schema
        .iter()
        .filter_map(|(name, dtype)| match dtype {
            DataType::Datetime(unit, tz) if *unit != CANONICAL_TIME_UNIT => Some(
                col(name.clone()).cast(DataType::Datetime(CANONICAL_TIME_UNIT, tz.clone())),
            ),
            _ => None,
        })
        .collect()
}

/// Normalize timestamp columns within a lazy plan
pub fn normalize_lazy(frame: LazyFrame, schema: &Schema) -> LazyFrame {
    let casts = normalization_casts(schema);
    if casts.is_empty() {
        return frame;
    }
    debug!("Normalizing {} timestamp column(s)", casts.len());
    frame.with_columns(casts)
}

/// Normalize timestamp columns of a materialized frame
pub fn normalize(frame: DataFrame) -> PolarsResult<DataFrame> {
    let casts = normalization_casts(frame.schema());
    if casts.is_empty() {
        return Ok(frame);
    }
    frame.lazy().with_columns(casts).collect()
}

/// True when every datetime column is at the canonical resolution
pub fn is_normalized(schema: &Schema) -> bool {
    normalization_casts(schema).is_empty()
}
