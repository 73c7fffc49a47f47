//! Schema inspection and per-partition column validation.
//!
//! Partitions are not guaranteed to share a schema, so requested columns are
//! checked against each partition's own footer before any row is read.

use crate::error::{LoaderError, Result};
use crate::models::Partition;
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Read a partition's schema from its file footer
pub fn read_partition_schema(path: &Path) -> Result<SchemaRef> {
    let mut scan = LazyFrame::scan_parquet(path, ScanArgsParquet::default())?;
    Ok(scan.collect_schema()?)
}

/// Validates requested columns against partition schemas
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Read `partition`'s schema and check every requested column exists in it
    ///
    /// Returns the schema so callers can plan the scan without reading the
    /// footer a second time.
    pub fn validate(&self, partition: &Partition, requested: &[String]) -> Result<SchemaRef> {
        let schema = read_partition_schema(&partition.path)?;
        self.validate_against(partition, &schema, requested)?;
        Ok(schema)
    }

    /// Check `requested` against an already-read schema
    pub fn validate_against(
        &self,
        partition: &Partition,
        schema: &Schema,
        requested: &[String],
    ) -> Result<()> {
        let missing = missing_columns(schema, requested);

        if let Some(first) = missing.first() {
            debug!(
                "Partition {} is missing {} requested column(s): {:?}",
                partition.month,
                missing.len(),
                missing
            );
            return Err(LoaderError::UnknownColumn {
                column: first.clone(),
                month: partition.month.to_string(),
                path: partition.path.clone(),
                missing,
            });
        }

        Ok(())
    }
}

/// Requested columns absent from `schema`, in request order
pub fn missing_columns(schema: &Schema, requested: &[String]) -> Vec<String> {
    requested
        .iter()
        .filter(|name| !schema.contains(name.as_str()))
        .cloned()
        .collect()
}
