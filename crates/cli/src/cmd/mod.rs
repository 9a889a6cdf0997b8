mod generate;
mod inspect;
mod plan;

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use serde::Serialize;

use restack_lib::config::{ReplayConfig, derive_root};
use restack_lib::consts::{DEFAULT_PREFIX, DEFAULT_TOOL_UNIT};
use restack_lib::registry::BuildRecord;

use restack_lib::util::whole_minutes;

use crate::output::parse_budget;

pub use generate::cmd_generate;
pub use inspect::cmd_inspect;
pub use plan::cmd_plan;

/// Where the reference tree lives and how to cut it into manifests.
#[derive(Args, Debug)]
pub struct SourceArgs {
  /// Installation generation the reference tree belongs to (e.g. 2025.06)
  #[arg(short = 'e', long, visible_alias = "eessi-version")]
  pub generation: String,

  /// Reference software subdirectory (e.g. x86_64/amd/zen4)
  #[arg(
    short = 'r',
    long,
    visible_alias = "reference-software-subdir",
    required_unless_present = "root"
  )]
  pub reference_subdir: Option<String>,

  /// Explicit root of the log tree, instead of deriving it from the generation
  #[arg(long)]
  pub root: Option<PathBuf>,

  /// Prefix the log tree root is derived under
  #[arg(long, default_value = DEFAULT_PREFIX)]
  pub prefix: PathBuf,

  /// Maximum build time per manifest (minutes, or a duration such as "4h")
  #[arg(
    short = 'm',
    long,
    visible_alias = "max-build-time",
    default_value = "240",
    value_parser = parse_budget
  )]
  pub max_batch_duration: Duration,

  /// EasyBuild version used to install EasyBuild itself; puts those installations first
  #[arg(short = 'o', long, visible_alias = "eb-override-version")]
  pub bootstrap_version: Option<String>,

  /// Unit name of the build tool
  #[arg(long, default_value = DEFAULT_TOOL_UNIT)]
  pub tool_unit: String,

  /// Number of crawl workers (default: available CPUs)
  #[arg(short = 'j', long)]
  pub workers: Option<usize>,
}

impl SourceArgs {
  /// Build the run configuration these arguments describe.
  pub fn to_config(&self) -> ReplayConfig {
    let root = match (&self.root, &self.reference_subdir) {
      (Some(root), _) => root.clone(),
      (None, Some(subdir)) => derive_root(&self.prefix, &self.generation, subdir),
      // clap requires one of the two
      (None, None) => PathBuf::from("."),
    };

    let mut config = ReplayConfig::new(root, self.generation.clone());
    config.max_batch_duration = self.max_batch_duration;
    config.bootstrap_version = self.bootstrap_version.clone();
    config.tool_unit = self.tool_unit.clone();
    config.workers = self.workers;
    config
  }
}

/// JSON view of a single installation.
#[derive(Debug, Serialize)]
pub struct RecordView {
  pub unit: String,
  pub version: String,
  pub initial_build_time: String,
  pub build_minutes: u64,
  pub builder_version: String,
  pub easyconfig: String,
  pub easyblocks: String,
}

impl From<&BuildRecord> for RecordView {
  fn from(record: &BuildRecord) -> Self {
    Self {
      unit: record.unit_name.clone(),
      version: record.unit_version.clone(),
      initial_build_time: record.initial_build_time.to_string(),
      build_minutes: whole_minutes(record.build_duration),
      builder_version: record.builder_version.clone(),
      easyconfig: record.artifact_ref.clone(),
      easyblocks: record.extension_ref.clone(),
    }
  }
}
