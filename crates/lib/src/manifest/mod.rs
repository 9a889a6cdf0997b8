//! Manifest emission.
//!
//! Each closed batch becomes one easystack file. File names carry a
//! zero-padded sequence number, so lexicographic file order is replay order
//! and entry order within a file is install order.
//!
//! Files are never overwritten. A set is written all or nothing: if any file
//! fails, every file already written by the same call is removed again.

mod types;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::MIN_SEQUENCE_WIDTH;

pub use types::*;

/// Errors that can occur while writing manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// A target file already exists.
  #[error("refusing to overwrite existing manifest {0}")]
  Exists(PathBuf),

  /// Writing a manifest failed.
  #[error("failed to write manifest {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The YAML body could not be serialized.
  #[error("failed to serialize manifest {sequence}: {source}")]
  Serialize {
    sequence: usize,
    #[source]
    source: serde_yaml::Error,
  },
}

/// Width of the sequence number for a set of `count` manifests.
pub fn sequence_width(count: usize) -> usize {
  count.to_string().len().max(MIN_SEQUENCE_WIDTH)
}

/// File name of `manifest`, e.g. `easystack-007-eb-4.9.4.yml`.
pub fn file_name(manifest: &Manifest, width: usize) -> String {
  let version: String = manifest
    .builder_version
    .chars()
    .map(|c| if c == '/' || c.is_whitespace() { '_' } else { c })
    .collect();
  format!("easystack-{:0width$}-eb-{}.yml", manifest.sequence, version, width = width)
}

/// Render the full file content: comment header followed by the YAML body.
pub fn render(manifest: &Manifest, file_name: &str) -> Result<String, ManifestError> {
  let body = serde_yaml::to_string(&EasystackDoc::from(manifest)).map_err(|source| ManifestError::Serialize {
    sequence: manifest.sequence,
    source,
  })?;

  Ok(format!(
    "# {}: total build duration = {} minutes\n# sequence {} of generation {}, builder EasyBuild {}\n{}",
    file_name,
    manifest.total_minutes(),
    manifest.sequence,
    manifest.generation,
    manifest.builder_version,
    body
  ))
}

/// Write `content` to a new file at `path` in a single append.
///
/// Fails if `path` already exists.
pub fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
  let mut file = OpenOptions::new()
    .append(true)
    .create_new(true)
    .open(path)
    .map_err(|source| {
      if source.kind() == io::ErrorKind::AlreadyExists {
        ManifestError::Exists(path.to_path_buf())
      } else {
        ManifestError::Write {
          path: path.to_path_buf(),
          source,
        }
      }
    })?;

  file
    .write_all(content.as_bytes())
    .and_then(|()| file.sync_all())
    .map_err(|source| ManifestError::Write {
      path: path.to_path_buf(),
      source,
    })
}

/// Write a complete manifest set into `dir`, in sequence order.
///
/// Every target name is checked before the first write. On failure the files
/// written so far are removed and the error is returned.
pub fn write_all(dir: &Path, manifests: &[Manifest]) -> Result<Vec<PathBuf>, ManifestError> {
  let width = sequence_width(manifests.len());

  let mut rendered = Vec::with_capacity(manifests.len());
  for manifest in manifests {
    let name = file_name(manifest, width);
    let path = dir.join(&name);
    if path.exists() {
      return Err(ManifestError::Exists(path));
    }
    rendered.push((path, render(manifest, &name)?));
  }

  fs::create_dir_all(dir).map_err(|source| ManifestError::Write {
    path: dir.to_path_buf(),
    source,
  })?;

  let mut written = Vec::with_capacity(rendered.len());
  for ((path, content), manifest) in rendered.into_iter().zip(manifests) {
    if let Err(e) = write_manifest(&path, &content) {
      if !matches!(e, ManifestError::Exists(_)) {
        // A failed write may have left a partial file of our own behind.
        written.push(path);
      }
      remove_written(&written);
      return Err(e);
    }
    debug!(
      path = %path.display(),
      batch = manifest.sequence,
      entries = manifest.entries.len(),
      "wrote manifest"
    );
    written.push(path);
  }

  info!(count = written.len(), dir = %dir.display(), "wrote manifests");
  Ok(written)
}

fn remove_written(paths: &[PathBuf]) {
  for path in paths {
    match fs::remove_file(path) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => warn!(path = %path.display(), error = %e, "failed to remove partial manifest"),
    }
  }
}
