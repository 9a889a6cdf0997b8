//! Record types for the build registry.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;

/// Identifies one installed unit/version pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
  pub unit: String,
  pub version: String,
}

impl fmt::Display for RecordKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.unit, self.version)
  }
}

/// One historical installation of a unit/version pair.
///
/// Ordering and duration come from the first attempt, while the builder
/// version and file references come from the last one, since a rebuild may
/// have used a newer builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRecord {
  pub unit_name: String,
  pub unit_version: String,
  /// Time of the first recorded attempt.
  pub initial_build_time: NaiveDateTime,
  /// Elapsed time of the first attempt.
  pub build_duration: Duration,
  /// Builder version of the last attempt.
  pub builder_version: String,
  /// Easyconfig used by the last attempt.
  pub artifact_ref: String,
  /// Easyblocks used by the last attempt, as a glob.
  pub extension_ref: String,
}

impl BuildRecord {
  pub fn key(&self) -> RecordKey {
    RecordKey {
      unit: self.unit_name.clone(),
      version: self.unit_version.clone(),
    }
  }
}
