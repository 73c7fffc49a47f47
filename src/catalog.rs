//! Partition catalog for monthly trip-record datasets
//!
//! Maps month identifiers to partition files under the raw data root and
//! enumerates the partitions that exist there. Files follow the naming
//! convention `<prefix>_<YYYY>-<MM>.<ext>`.

use crate::config::LoaderConfig;
use crate::constants::partition_file_name;
use crate::error::{LoaderError, Result};
use crate::models::{Month, Partition};
use crate::schema::read_partition_schema;
use polars::prelude::SchemaRef;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Catalog of monthly partitions under one raw data root
#[derive(Debug, Clone)]
pub struct PartitionCatalog {
    root: PathBuf,
    file_prefix: String,
    file_extension: String,
}

impl PartitionCatalog {
    /// Create a catalog for `root`; performs no I/O
    pub fn new(root: impl Into<PathBuf>, config: &LoaderConfig) -> Self {
        Self {
            root: root.into(),
            file_prefix: config.file_prefix.clone(),
            file_extension: config.file_extension.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Expected path of the partition for `month`, whether or not it exists
    pub fn partition_path(&self, month: &Month) -> PathBuf {
        self.root.join(partition_file_name(
            &self.file_prefix,
            &month.to_string(),
            &self.file_extension,
        ))
    }

    /// Resolve a month to its partition file
    pub fn resolve(&self, month: &Month) -> Result<Partition> {
        let path = self.partition_path(month);
        if !path.is_file() {
            return Err(LoaderError::PartitionNotFound {
                month: month.to_string(),
                path,
            });
        }
        Ok(Partition {
            month: *month,
            path,
        })
    }

    /// Enumerate every partition under the root, sorted by month
    pub fn partitions(&self) -> Result<Vec<Partition>> {
        let pattern = format!(
            "{}/{}_*.{}",
            glob::Pattern::escape(&self.root.to_string_lossy()),
            glob::Pattern::escape(&self.file_prefix),
            glob::Pattern::escape(&self.file_extension)
        );
        debug!("Searching for partitions with pattern: {}", pattern);

        let name_regex = self.file_name_regex()?;
        let paths = glob::glob(&pattern).map_err(|e| LoaderError::Glob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let mut partitions = Vec::new();
        for entry in paths {
            let path = entry.map_err(glob::GlobError::into_error)?;
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(captures) = name_regex.captures(file_name) else {
                debug!("Ignoring file outside naming convention: {}", file_name);
                continue;
            };
            // The regex only admits well-formed digits; an impossible month
            // such as 2024-13 is skipped rather than treated as a partition.
            match captures[1].parse::<Month>() {
                Ok(month) => partitions.push(Partition { month, path }),
                Err(_) => debug!("Ignoring file with invalid month: {}", file_name),
            }
        }

        partitions.sort_by(|a, b| a.month.cmp(&b.month));
        debug!("Found {} partitions under {}", partitions.len(), self.root.display());
        Ok(partitions)
    }

    /// Months with a backing partition, sorted ascending
    pub fn months(&self) -> Result<Vec<Month>> {
        Ok(self.partitions()?.into_iter().map(|p| p.month).collect())
    }

    /// Schema declared by the representative (earliest) partition
    ///
    /// Reads the file footer only; no row data is materialised.
    pub fn declared_schema(&self) -> Result<SchemaRef> {
        let partitions = self.partitions()?;
        let first = partitions.first().ok_or_else(|| LoaderError::EmptyCatalog {
            path: self.root.clone(),
        })?;
        debug!(
            "Reading declared schema from representative partition {}",
            first.path.display()
        );
        read_partition_schema(&first.path)
    }

    fn file_name_regex(&self) -> Result<Regex> {
        let expression = format!(
            r"^{}_(\d{{4}}-\d{{2}})\.{}$",
            regex::escape(&self.file_prefix),
            regex::escape(&self.file_extension)
        );
        Regex::new(&expression).map_err(|e| LoaderError::Glob {
            pattern: expression,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_partition(dir: &Path, name: &str) {
        let mut df = df!("trip_miles" => [1.5f64, 2.0], "fare" => [10.0f64, 12.5]).unwrap();
        let file = fs::File::create(dir.join(name)).unwrap();
        ParquetWriter::new(file).finish(&mut df).unwrap();
    }

    fn catalog(dir: &TempDir) -> PartitionCatalog {
        PartitionCatalog::new(dir.path(), &LoaderConfig::default())
    }

    #[test]
    fn test_resolve_existing_partition() {
        let temp_dir = TempDir::new().unwrap();
        write_partition(temp_dir.path(), "fhvhv_tripdata_2024-01.parquet");

        let month: Month = "2024-01".parse().unwrap();
        let partition = catalog(&temp_dir).resolve(&month).unwrap();

        assert_eq!(partition.month, month);
        assert_eq!(
            partition.path,
            temp_dir.path().join("fhvhv_tripdata_2024-01.parquet")
        );
    }

    #[test]
    fn test_resolve_missing_partition() {
        let temp_dir = TempDir::new().unwrap();
        write_partition(temp_dir.path(), "fhvhv_tripdata_2024-01.parquet");

        let month: Month = "2024-03".parse().unwrap();
        match catalog(&temp_dir).resolve(&month).unwrap_err() {
            LoaderError::PartitionNotFound { month, path } => {
                assert_eq!(month, "2024-03");
                assert!(path.ends_with("fhvhv_tripdata_2024-03.parquet"));
            }
            other => panic!("Expected PartitionNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_partitions_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        write_partition(temp_dir.path(), "fhvhv_tripdata_2024-02.parquet");
        write_partition(temp_dir.path(), "fhvhv_tripdata_2023-12.parquet");
        write_partition(temp_dir.path(), "fhvhv_tripdata_2024-01.parquet");
        // Ignored: wrong prefix, bad month, wrong extension
        write_partition(temp_dir.path(), "yellow_tripdata_2024-01.parquet");
        write_partition(temp_dir.path(), "fhvhv_tripdata_2024-13.parquet");
        fs::write(temp_dir.path().join("fhvhv_tripdata_2024-04.csv"), "x").unwrap();
        fs::create_dir(temp_dir.path().join("fhvhv_tripdata_2024-05.parquet")).unwrap();

        let months: Vec<String> = catalog(&temp_dir)
            .months()
            .unwrap()
            .iter()
            .map(Month::to_string)
            .collect();

        assert_eq!(months, vec!["2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_declared_schema_from_first_partition() {
        let temp_dir = TempDir::new().unwrap();
        write_partition(temp_dir.path(), "fhvhv_tripdata_2024-01.parquet");

        let schema = catalog(&temp_dir).declared_schema().unwrap();
        let names: Vec<&str> = schema.iter_names().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["trip_miles", "fare"]);
    }

    #[test]
    fn test_declared_schema_empty_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let result = catalog(&temp_dir).declared_schema();
        assert!(matches!(result, Err(LoaderError::EmptyCatalog { .. })));
    }

    #[test]
    fn test_custom_prefix() {
        let temp_dir = TempDir::new().unwrap();
        write_partition(temp_dir.path(), "yellow_tripdata_2024-01.parquet");
        write_partition(temp_dir.path(), "fhvhv_tripdata_2024-02.parquet");

        let config = LoaderConfig {
            file_prefix: "yellow_tripdata".to_string(),
            ..Default::default()
        };
        let catalog = PartitionCatalog::new(temp_dir.path(), &config);
        let months = catalog.months().unwrap();

        assert_eq!(months.len(), 1);
        assert_eq!(months[0].to_string(), "2024-01");
    }
}
