//! Single-partition loading.
//!
//! Loading a month is split into two phases. [`PartitionLoader::plan`]
//! resolves the partition, validates the requested columns against its footer
//! and builds a lazy scan; it reads no row data. [`PartitionLoader::execute`]
//! runs the scan, applies sampling and returns a normalized frame.

use super::request::LoadRequest;
use crate::catalog::PartitionCatalog;
use crate::config::LoaderConfig;
use crate::error::Result;
use crate::models::{LoadOptions, Month, Partition};
use crate::normalize::normalize_lazy;
use crate::schema::SchemaValidator;
use polars::prelude::*;
use tracing::debug;

/// Mixing constant for per-partition seeds
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// A validated, not yet executed scan of one partition
pub struct PartitionPlan {
    pub partition: Partition,
    /// Columns the validity filter was applied to
    pub filtered_columns: Vec<String>,
    frame: LazyFrame,
}

impl std::fmt::Debug for PartitionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionPlan")
            .field("partition", &self.partition)
            .field("filtered_columns", &self.filtered_columns)
            .finish_non_exhaustive()
    }
}

/// Loads one month's partition
#[derive(Debug, Clone, Copy)]
pub struct PartitionLoader<'a> {
    catalog: &'a PartitionCatalog,
    config: &'a LoaderConfig,
    validator: SchemaValidator,
}

impl<'a> PartitionLoader<'a> {
    pub fn new(catalog: &'a PartitionCatalog, config: &'a LoaderConfig) -> Self {
        Self {
            catalog,
            config,
            validator: SchemaValidator::new(),
        }
    }

    /// Resolve, validate and plan the scan of `month`
    pub fn plan(&self, month: &Month, request: &LoadRequest) -> Result<PartitionPlan> {
        let partition = self.catalog.resolve(month)?;
        let schema = self.validator.validate(&partition, &request.features)?;

        let scan_args = ScanArgsParquet {
            parallel: if self.config.parallel_scan {
                ParallelStrategy::Auto
            } else {
                ParallelStrategy::None
            },
            ..Default::default()
        };

        // Only the requested columns are read from the file
        let projection: Vec<Expr> = request.features.iter().map(|name| col(name.as_str())).collect();
        let mut frame = LazyFrame::scan_parquet(&partition.path, scan_args)?.select(projection);

        let filtered_columns: Vec<String> = if request.options.clean {
            self.config
                .validity_filter
                .filtered_columns(&request.features)
                .into_iter()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        if let Some(predicate) = validity_predicate(&filtered_columns) {
            frame = frame.filter(predicate);
        } else if request.options.clean {
            debug!(
                "No distance, duration or fare column requested for {}; validity filter skipped",
                partition.month
            );
        }

        let projected_schema = Schema::from_iter(request.features.iter().filter_map(|name| {
            schema
                .get(name.as_str())
                .map(|dtype| Field::new(name.as_str().into(), dtype.clone()))
        }));
        let frame = normalize_lazy(frame, &projected_schema);

        Ok(PartitionPlan {
            partition,
            filtered_columns,
            frame,
        })
    }

    /// Run a planned scan, then sample
    pub fn execute(&self, plan: PartitionPlan, options: &LoadOptions) -> Result<DataFrame> {
        let PartitionPlan {
            partition, frame, ..
        } = plan;

        let df = frame.collect()?;
        debug!(
            "Loaded {} rows from partition {}",
            df.height(),
            partition.month
        );

        self.sample(df, &partition.month, options.sample_ratio)
    }

    /// Plan and execute in one step
    pub fn load_one(&self, month: &Month, request: &LoadRequest) -> Result<DataFrame> {
        let plan = self.plan(month, request)?;
        self.execute(plan, &request.options)
    }

    /// Uniform random sample without replacement
    ///
    /// The seed is derived from the configured base seed and the month, so a
    /// partition samples the same rows whichever batch it lands in.
    fn sample(&self, df: DataFrame, month: &Month, sample_ratio: f64) -> Result<DataFrame> {
        if sample_ratio >= 1.0 {
            return Ok(df);
        }

        let seed = self.partition_seed(month);
        let frac = Series::new("frac".into(), [sample_ratio]);
        let sampled = df.sample_frac(&frac, false, false, seed)?;
        debug!(
            "Sampled {} of {} rows from partition {} (ratio {})",
            sampled.height(),
            df.height(),
            month,
            sample_ratio
        );
        Ok(sampled)
    }

    fn partition_seed(&self, month: &Month) -> Option<u64> {
        self.config
            .sample_seed
            .map(|seed| seed ^ month.ordinal().wrapping_mul(SEED_MIX))
    }
}

/// Conjunction of `column > 0` over `columns`; `None` when there is nothing
/// to filter on
pub fn validity_predicate(columns: &[String]) -> Option<Expr> {
    columns
        .iter()
        .map(|name| col(name.as_str()).gt(lit(0)))
        .reduce(|acc, predicate| acc.and(predicate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::fixtures::{TripFixture, write_trip_partition};
    use tempfile::TempDir;

    fn request(features: &[&str], months: &[&str], options: LoadOptions) -> LoadRequest {
        LoadRequest::new(features, months, options).unwrap()
    }

    #[test]
    fn test_validity_predicate_empty() {
        assert!(validity_predicate(&[]).is_none());
        assert!(validity_predicate(&["fare".to_string()]).is_some());
    }

    #[test]
    fn test_load_one_projects_requested_columns() {
        let temp_dir = TempDir::new().unwrap();
        write_trip_partition(temp_dir.path(), "2024-01", &TripFixture::standard(5));

        let config = LoaderConfig::default();
        let catalog = PartitionCatalog::new(temp_dir.path(), &config);
        let loader = PartitionLoader::new(&catalog, &config);

        let req = request(
            &["base_passenger_fare", "PULocationID"],
            &["2024-01"],
            LoadOptions::default(),
        );
        let df = loader.load_one(&req.months[0], &req).unwrap();

        let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["base_passenger_fare", "PULocationID"]);
        assert_eq!(df.height(), 5);
    }

    #[test]
    fn test_plan_records_filtered_columns() {
        let temp_dir = TempDir::new().unwrap();
        write_trip_partition(temp_dir.path(), "2024-01", &TripFixture::standard(3));

        let config = LoaderConfig::default();
        let catalog = PartitionCatalog::new(temp_dir.path(), &config);
        let loader = PartitionLoader::new(&catalog, &config);

        let req = request(
            &["PULocationID", "trip_time", "trip_miles"],
            &["2024-01"],
            LoadOptions::default(),
        );
        let plan = loader.plan(&req.months[0], &req).unwrap();
        assert_eq!(plan.filtered_columns, vec!["trip_time", "trip_miles"]);

        let unclean = request(
            &["trip_miles"],
            &["2024-01"],
            LoadOptions::default().with_clean(false),
        );
        let plan = loader.plan(&unclean.months[0], &unclean).unwrap();
        assert!(plan.filtered_columns.is_empty());
    }

    #[test]
    fn test_partition_seed_depends_on_month() {
        let temp_dir = TempDir::new().unwrap();
        let config = LoaderConfig::default();
        let catalog = PartitionCatalog::new(temp_dir.path(), &config);
        let loader = PartitionLoader::new(&catalog, &config);

        let jan: Month = "2024-01".parse().unwrap();
        let feb: Month = "2024-02".parse().unwrap();
        assert_ne!(loader.partition_seed(&jan), loader.partition_seed(&feb));
        assert_eq!(loader.partition_seed(&jan), loader.partition_seed(&jan));

        let unseeded = LoaderConfig {
            sample_seed: None,
            ..Default::default()
        };
        let loader = PartitionLoader::new(&catalog, &unseeded);
        assert_eq!(loader.partition_seed(&jan), None);
    }
}
