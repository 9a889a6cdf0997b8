//! Run configuration.
//!
//! Every stage receives a [`ReplayConfig`] explicitly; nothing is read from
//! process-wide state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::consts::{DEFAULT_MAX_BATCH_MINUTES, DEFAULT_TOOL_UNIT};

/// Options for a single reconstruction run.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
  /// Root of the reference tree, laid out as `<root>/<unit>/<version>/<attempt>/`.
  pub root: PathBuf,
  /// Label of the installation generation the tree belongs to.
  pub generation: String,
  /// Maximum accumulated build time of one manifest.
  pub max_batch_duration: Duration,
  /// Builder version used to install the build tool itself, if overridden.
  pub bootstrap_version: Option<String>,
  /// Unit name of the build tool, the target of `bootstrap_version`.
  pub tool_unit: String,
  /// Size of the crawl worker pool. `None` uses the host's available parallelism.
  pub workers: Option<usize>,
  /// Directory the manifests are written to.
  pub output_dir: PathBuf,
}

impl ReplayConfig {
  /// Create a configuration for `root` with default settings.
  pub fn new(root: impl Into<PathBuf>, generation: impl Into<String>) -> Self {
    Self {
      root: root.into(),
      generation: generation.into(),
      max_batch_duration: Duration::from_secs(DEFAULT_MAX_BATCH_MINUTES * 60),
      bootstrap_version: None,
      tool_unit: DEFAULT_TOOL_UNIT.to_string(),
      workers: None,
      output_dir: PathBuf::from("."),
    }
  }

  /// The bootstrap override that applies to `unit`, if any.
  pub fn bootstrap_for(&self, unit: &str) -> Option<&str> {
    if unit == self.tool_unit {
      self.bootstrap_version.as_deref()
    } else {
      None
    }
  }

  /// Number of crawl workers to spawn.
  pub fn worker_count(&self) -> usize {
    self
      .workers
      .filter(|&n| n > 0)
      .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
      .unwrap_or(1)
  }
}

/// Derive the reference tree root from a generation label.
///
/// Produces `<prefix>/<generation>/software/linux/<subdir>/reprod`, the place
/// build logs are backed up to after each installation.
pub fn derive_root(prefix: &Path, generation: &str, subdir: &str) -> PathBuf {
  prefix
    .join(generation)
    .join("software")
    .join("linux")
    .join(subdir.trim_matches('/'))
    .join("reprod")
}
