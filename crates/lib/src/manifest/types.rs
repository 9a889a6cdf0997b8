//! Manifest types for restack.
//!
//! A manifest is the durable form of one batch: an easystack file listing the
//! easyconfigs to install, in order, with the easyblocks each one used.
//!
//! # Format
//!
//! ```yaml
//! # easystack-001-eb-4.9.4.yml: total build duration = 110 minutes
//! # sequence 1 of generation 2025.06, builder EasyBuild 4.9.4
//! easyconfigs:
//! - /reprod/GCC/13.2.0/20250612_081502UTC/easybuild/GCC-13.2.0.eb:
//!     options:
//!       include-easyblocks: /reprod/GCC/13.2.0/20250612_081502UTC/easybuild/reprod/easyblocks/*.py
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::segment::Batch;
use crate::util::whole_minutes;

/// One easyconfig to install, with the easyblocks it was built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
  pub artifact_ref: String,
  pub extension_ref: String,
}

/// The serialized form of one closed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
  /// 1-based position in replay order.
  pub sequence: usize,
  pub builder_version: String,
  pub total_duration: Duration,
  /// Installation generation the batch was taken from.
  pub generation: String,
  pub entries: Vec<ManifestEntry>,
}

impl Manifest {
  /// Build the manifest of the `sequence`-th batch.
  pub fn from_batch(sequence: usize, batch: &Batch, generation: &str) -> Self {
    Self {
      sequence,
      builder_version: batch.builder_version.clone(),
      total_duration: batch.total_duration,
      generation: generation.to_string(),
      entries: batch
        .records
        .iter()
        .map(|r| ManifestEntry {
          artifact_ref: r.artifact_ref.clone(),
          extension_ref: r.extension_ref.clone(),
        })
        .collect(),
    }
  }

  /// Total duration in whole minutes, rounded to nearest.
  pub fn total_minutes(&self) -> u64 {
    whole_minutes(self.total_duration)
  }
}

/// Body of an easystack file.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EasystackDoc {
  /// Each item maps a single easyconfig path to its options.
  pub easyconfigs: Vec<BTreeMap<String, EasyconfigOptions>>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EasyconfigOptions {
  pub options: EasyblockOptions,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EasyblockOptions {
  #[serde(rename = "include-easyblocks")]
  pub include_easyblocks: String,
}

impl From<&Manifest> for EasystackDoc {
  fn from(manifest: &Manifest) -> Self {
    Self {
      easyconfigs: manifest
        .entries
        .iter()
        .map(|e| {
          BTreeMap::from([(
            e.artifact_ref.clone(),
            EasyconfigOptions {
              options: EasyblockOptions {
                include_easyblocks: e.extension_ref.clone(),
              },
            },
          )])
        })
        .collect(),
    }
  }
}
