//! Batch orchestration for memory-bounded loading
//!
//! Splits the requested months into contiguous batches and yields one
//! concatenated frame per batch. Only the partitions of the batch being
//! loaded are resident; a yielded frame belongs to the caller.

use super::partition::{PartitionLoader, PartitionPlan};
use super::request::{LoadRequest, validate_batch_size};
use crate::config::LoaderConfig;
use crate::error::Result;
use crate::models::{Batch, LoadOptions, Month};
use polars::prelude::*;
use std::collections::VecDeque;
use sysinfo::System;
use tracing::{debug, info, warn};

/// Split `months` into contiguous groups of at most `batch_size`
pub fn plan_batches(months: &[Month], batch_size: usize) -> Result<Vec<Batch>> {
    validate_batch_size(batch_size)?;
    Ok(months
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            months: chunk.to_vec(),
        })
        .collect())
}

/// Vertically concatenate column-aligned frames
pub fn concat_frames(frames: Vec<DataFrame>, parallel: bool) -> Result<DataFrame> {
    let mut frames = frames;
    if frames.len() == 1 {
        if let Some(frame) = frames.pop() {
            return Ok(frame);
        }
    }

    let lazy_frames: Vec<LazyFrame> = frames.into_iter().map(IntoLazy::lazy).collect();
    let args = UnionArgs {
        parallel,
        rechunk: true,
        ..Default::default()
    };
    Ok(concat(lazy_frames, args)?.collect()?)
}

/// Warns when system memory use crosses a threshold
#[derive(Debug)]
pub struct MemoryMonitor {
    system: System,
    threshold: f64,
}

impl MemoryMonitor {
    pub fn new(threshold: f64) -> Self {
        Self {
            system: System::new(),
            threshold,
        }
    }

    /// Check if system is under memory pressure
    pub fn check_memory_pressure(&mut self) -> bool {
        self.system.refresh_memory();

        let used_memory = self.system.used_memory() as f64;
        let total_memory = self.system.total_memory() as f64;

        if total_memory == 0.0 {
            return false;
        }

        let memory_usage = used_memory / total_memory;
        let is_pressure = memory_usage > self.threshold;

        if is_pressure {
            debug!(
                "Memory pressure detected: {:.1}% usage (threshold: {:.1}%)",
                memory_usage * 100.0,
                self.threshold * 100.0
            );
        }

        is_pressure
    }
}

/// Lazy sequence of per-batch frames
///
/// Every partition of the request is planned when the iterator is built, so
/// a missing month or column fails before any row data is read. Each call to
/// `next` executes one batch. The iterator stops after the first error.
pub struct BatchIter<'a> {
    loader: PartitionLoader<'a>,
    options: LoadOptions,
    parallel: bool,
    pending: VecDeque<(Batch, Vec<PartitionPlan>)>,
    total_batches: usize,
    memory_monitor: MemoryMonitor,
    failed: bool,
}

impl<'a> BatchIter<'a> {
    /// Plan every batch of `request`
    pub fn new(
        loader: PartitionLoader<'a>,
        config: &LoaderConfig,
        request: &LoadRequest,
        batch_size: usize,
    ) -> Result<Self> {
        let batches = plan_batches(&request.months, batch_size)?;
        let total_batches = batches.len();

        let mut pending = VecDeque::with_capacity(total_batches);
        for batch in batches {
            let plans = batch
                .months
                .iter()
                .map(|month| loader.plan(month, request))
                .collect::<Result<Vec<_>>>()?;
            pending.push_back((batch, plans));
        }

        debug!(
            "Planned {} batches of up to {} months for {} months",
            total_batches,
            batch_size,
            request.months.len()
        );

        Ok(Self {
            loader,
            options: request.options,
            parallel: config.parallel_scan,
            pending,
            total_batches,
            memory_monitor: MemoryMonitor::new(config.memory_threshold),
            failed: false,
        })
    }

    /// Number of batches in the request
    pub fn total_batches(&self) -> usize {
        self.total_batches
    }

    /// Number of batches not yet yielded
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn load_batch(&mut self, batch: &Batch, plans: Vec<PartitionPlan>) -> Result<DataFrame> {
        let months: Vec<String> = batch.months.iter().map(Month::to_string).collect();
        info!(
            "Processing batch {}/{}: {:?}",
            batch.index + 1,
            self.total_batches,
            months
        );

        let frames = plans
            .into_iter()
            .map(|plan| self.loader.execute(plan, &self.options))
            .collect::<Result<Vec<_>>>()?;

        debug!("Concatenating batch of {} frames", frames.len());
        let frame = concat_frames(frames, self.parallel)?;
        info!("Batch {} completed: {} rows", batch.index + 1, frame.height());

        if self.memory_monitor.check_memory_pressure() {
            warn!(
                "Memory pressure detected after batch {}; consider a smaller batch size",
                batch.index + 1
            );
        }

        Ok(frame)
    }
}

impl Iterator for BatchIter<'_> {
    type Item = Result<DataFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (batch, plans) = self.pending.pop_front()?;
        let result = self.load_batch(&batch, plans);
        if result.is_err() {
            self.failed = true;
            self.pending.clear();
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.pending.len()))
        }
    }
}
