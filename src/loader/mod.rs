//! Loader facade for monthly trip-record partitions.
//!
//! [`TlcDataLoader`] is the public entry point. Each call is independent:
//! the only state a loader holds is its raw data root and configuration.
//! Every call validates its arguments and plans every partition before any
//! row data is read, and any failure aborts the whole call.

pub mod batch;
pub mod partition;
pub mod request;

#[cfg(test)]
pub mod tests;

use self::{batch::BatchIter, partition::PartitionLoader, request::LoadRequest};

use crate::catalog::PartitionCatalog;
use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::models::{LoadOptions, Month};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Batched columnar loader for a directory of monthly partitions
#[derive(Debug, Clone)]
pub struct TlcDataLoader {
    catalog: PartitionCatalog,
    config: LoaderConfig,
}

impl TlcDataLoader {
    /// Create a loader over `raw_data_root` with the default configuration
    ///
    /// Only checks that the directory exists.
    pub fn new(raw_data_root: impl Into<PathBuf>) -> Result<Self> {
        let root = raw_data_root.into();
        if !root.is_dir() {
            return Err(LoaderError::DirectoryNotFound { path: root });
        }

        let config = LoaderConfig::default();
        Ok(Self {
            catalog: PartitionCatalog::new(root, &config),
            config,
        })
    }

    /// Configure the loader
    pub fn with_config(self, config: LoaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog: PartitionCatalog::new(self.catalog.root().to_path_buf(), &config),
            config,
        })
    }

    pub fn root(&self) -> &Path {
        self.catalog.root()
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PartitionCatalog {
        &self.catalog
    }

    /// Load every requested month in one pass and concatenate the result
    ///
    /// Suitable when the selected data fits in memory. Columns come back in
    /// the order given by `features`.
    pub fn load<F, M>(&self, features: &[F], months: &[M], options: LoadOptions) -> Result<DataFrame>
    where
        F: AsRef<str>,
        M: AsRef<str>,
    {
        let start_time = Instant::now();
        let request = LoadRequest::new(features, months, options)?;
        let loader = self.partition_loader();

        info!("Selected {} partitions", request.months.len());
        info!("Loading columns: {:?}", request.features);

        // Plan everything first so any missing month or column fails before a read
        let plans = request
            .months
            .iter()
            .map(|month| loader.plan(month, &request))
            .collect::<Result<Vec<_>>>()?;

        let frames = plans
            .into_iter()
            .map(|plan| loader.execute(plan, &request.options))
            .collect::<Result<Vec<_>>>()?;

        let df = batch::concat_frames(frames, self.config.parallel_scan)?;
        info!(
            "Loaded {} rows in {}ms",
            df.height(),
            start_time.elapsed().as_millis()
        );
        Ok(df)
    }

    /// Load the requested months `batch_size` at a time and accumulate
    ///
    /// Returns the same rows as [`TlcDataLoader::load`] while keeping at most
    /// one batch of partitions resident during reads.
    pub fn load_in_batches<F, M>(
        &self,
        features: &[F],
        months: &[M],
        batch_size: usize,
        options: LoadOptions,
    ) -> Result<DataFrame>
    where
        F: AsRef<str>,
        M: AsRef<str>,
    {
        let start_time = Instant::now();
        let batches = self.iter_batches(features, months, batch_size, options)?;
        let total_batches = batches.total_batches();

        let mut accumulated: Option<DataFrame> = None;
        for frame in batches {
            let frame = frame?;
            match accumulated.as_mut() {
                Some(acc) => {
                    acc.vstack_mut(&frame)?;
                }
                None => accumulated = Some(frame),
            }
        }

        info!("Merged {} batches", total_batches);
        let df = accumulated
            .ok_or_else(|| LoaderError::invalid_argument("no batches were produced"))?;
        info!(
            "Total rows: {} ({}ms)",
            df.height(),
            start_time.elapsed().as_millis()
        );
        Ok(df)
    }

    /// Stream the request as one frame per batch
    ///
    /// Each call plans afresh; iterating again re-reads from disk.
    pub fn iter_batches<F, M>(
        &self,
        features: &[F],
        months: &[M],
        batch_size: usize,
        options: LoadOptions,
    ) -> Result<BatchIter<'_>>
    where
        F: AsRef<str>,
        M: AsRef<str>,
    {
        request::validate_batch_size(batch_size)?;
        let request = LoadRequest::new(features, months, options)?;

        info!(
            "Selected {} partitions in batches of {}",
            request.months.len(),
            batch_size
        );
        info!("Loading columns: {:?}", request.features);

        BatchIter::new(self.partition_loader(), &self.config, &request, batch_size)
    }

    /// Column names declared by the catalog, in file order
    ///
    /// Reads only the footer of the representative partition.
    pub fn list_features(&self) -> Result<Vec<String>> {
        let schema = self.catalog.declared_schema()?;
        let names: Vec<String> = schema.iter_names().map(|name| name.to_string()).collect();
        debug!("Available columns ({} total)", names.len());
        Ok(names)
    }

    /// Schema declared by the catalog
    pub fn declared_schema(&self) -> Result<SchemaRef> {
        self.catalog.declared_schema()
    }

    /// Months with a backing partition, sorted ascending
    pub fn available_months(&self) -> Result<Vec<Month>> {
        let months = self.catalog.months()?;
        if months.is_empty() {
            return Err(LoaderError::EmptyCatalog {
                path: self.catalog.root().to_path_buf(),
            });
        }
        Ok(months)
    }

    fn partition_loader(&self) -> PartitionLoader<'_> {
        PartitionLoader::new(&self.catalog, &self.config)
    }
}
