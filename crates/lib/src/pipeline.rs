//! End-to-end reconstruction run.
//!
//! crawl → extract → aggregate → sort → segment → emit. Only the crawl and
//! extraction phase is parallel; every later phase runs on the calling
//! thread. Any error aborts the run before a manifest is written.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ReplayConfig;
use crate::crawl::{CrawlError, list_units};
use crate::manifest::{Manifest, ManifestError, write_all};
use crate::registry::{AggregateError, BuildRecord, aggregate};
use crate::segment::{Batch, SegmentError, segment, verify};

/// Errors that can abort a run.
#[derive(Debug, Error)]
pub enum ReplayError {
  #[error(transparent)]
  Crawl(#[from] CrawlError),

  #[error(transparent)]
  Aggregate(#[from] AggregateError),

  #[error(transparent)]
  Segment(#[from] SegmentError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),
}

/// The chronologically ordered registry of a reference tree.
#[derive(Debug, Clone)]
pub struct Inventory {
  /// Unit names found under the root.
  pub units: Vec<String>,
  /// Every installation, ordered by initial build time.
  pub records: Vec<BuildRecord>,
}

impl Inventory {
  /// Sum of all build durations.
  pub fn total_duration(&self) -> Duration {
    self.records.iter().map(|r| r.build_duration).sum()
  }
}

/// Batches computed from an inventory, not yet written.
#[derive(Debug, Clone)]
pub struct ReplayPlan {
  pub inventory: Inventory,
  pub batches: Vec<Batch>,
}

impl ReplayPlan {
  /// Manifests for every batch, numbered from 1.
  pub fn manifests(&self, generation: &str) -> Vec<Manifest> {
    self
      .batches
      .iter()
      .enumerate()
      .map(|(i, batch)| Manifest::from_batch(i + 1, batch, generation))
      .collect()
  }
}

/// Outcome of a complete run.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
  pub plan: ReplayPlan,
  /// Manifest files written, in replay order.
  pub written: Vec<PathBuf>,
}

/// Crawl the tree and order every installation chronologically.
pub fn collect(config: &ReplayConfig) -> Result<Inventory, ReplayError> {
  let units = list_units(&config.root)?;
  info!(root = %config.root.display(), units = units.len(), "discovered software");
  debug!(units = ?units, "software list");

  let registry = aggregate(&units, config)?;
  info!(
    records = registry.len(),
    root = %config.root.display(),
    "gathered information for software installations"
  );

  Ok(Inventory {
    units,
    records: registry.into_chronological(),
  })
}

/// Collect the inventory and partition it into batches.
pub fn plan(config: &ReplayConfig) -> Result<ReplayPlan, ReplayError> {
  let inventory = collect(config)?;
  let expected: Vec<_> = inventory.records.iter().map(BuildRecord::key).collect();

  let batches = segment(inventory.records.iter().cloned(), config.max_batch_duration);
  verify(&batches, &expected, config.max_batch_duration)?;

  info!(
    batches = batches.len(),
    max_batch_secs = config.max_batch_duration.as_secs(),
    "segmented installations"
  );
  Ok(ReplayPlan { inventory, batches })
}

/// Run the full pipeline and write the manifests to `config.output_dir`.
pub fn run(config: &ReplayConfig) -> Result<ReplayOutcome, ReplayError> {
  let plan = plan(config)?;
  if plan.batches.is_empty() {
    warn!(root = %config.root.display(), "no installations found, writing no manifests");
    return Ok(ReplayOutcome {
      plan,
      written: Vec::new(),
    });
  }

  let manifests = plan.manifests(&config.generation);
  let written = write_all(&config.output_dir, &manifests)?;
  Ok(ReplayOutcome { plan, written })
}
