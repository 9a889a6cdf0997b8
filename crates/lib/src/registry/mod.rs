//! Parallel aggregation of crawl results into one registry.
//!
//! Each unit is crawled by an independent worker that only reads the tree
//! and returns its records. Workers share nothing; results are joined and
//! merged on the calling thread once every worker has finished.

mod types;

use std::collections::HashSet;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ReplayConfig;
use crate::crawl::{CrawlError, crawl_unit};

pub use types::{BuildRecord, RecordKey};

/// Errors that can occur during aggregation.
#[derive(Debug, Error)]
pub enum AggregateError {
  /// The worker pool could not be started.
  #[error("failed to start worker pool: {0}")]
  Pool(#[from] rayon::ThreadPoolBuildError),

  /// A worker failed to crawl its unit.
  #[error(transparent)]
  Crawl(#[from] CrawlError),

  /// Two workers produced the same unit/version pair.
  #[error("invariant violation: {0}")]
  InvariantViolation(String),
}

/// All installations of the reference tree, keyed by unit/version.
///
/// Records are kept in merge order. The registry is only built whole by
/// [`aggregate`] or [`BuildRegistry::merge`] and is read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct BuildRegistry {
  records: Vec<BuildRecord>,
  keys: HashSet<RecordKey>,
}

impl BuildRegistry {
  /// Merge per-unit partial results in the given order.
  ///
  /// Keys are disjoint by construction; a collision is reported as an
  /// invariant violation and never overwrites.
  pub fn merge<I>(partials: I) -> Result<Self, AggregateError>
  where
    I: IntoIterator<Item = Vec<BuildRecord>>,
  {
    let mut registry = Self::default();
    for record in partials.into_iter().flatten() {
      let key = record.key();
      if registry.keys.contains(&key) {
        return Err(AggregateError::InvariantViolation(format!(
          "duplicate registry key {}",
          key
        )));
      }
      registry.keys.insert(key);
      registry.records.push(record);
    }
    Ok(registry)
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Records ordered by initial build time.
  ///
  /// The sort is stable: records sharing a build time keep merge order.
  pub fn into_chronological(self) -> Vec<BuildRecord> {
    let mut records = self.records;
    records.sort_by_key(|r| r.initial_build_time);
    records
  }
}

/// Crawl `units` on a fixed-size worker pool and merge the results.
///
/// Fails fast: the first worker error aborts the run and every other
/// worker's result is discarded.
pub fn aggregate(units: &[String], config: &ReplayConfig) -> Result<BuildRegistry, AggregateError> {
  let workers = config.worker_count();
  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(workers)
    .thread_name(|i| format!("restack-crawl-{}", i))
    .build()?;

  info!(units = units.len(), workers, "gathering build information from logs");

  let partials: Vec<Vec<BuildRecord>> = pool.install(|| {
    units
      .par_iter()
      .map(|unit| crawl_unit(unit, config))
      .collect::<Result<Vec<_>, _>>()
  })?;

  let registry = BuildRegistry::merge(partials)?;
  debug!(records = registry.len(), "merged registry");
  Ok(registry)
}
