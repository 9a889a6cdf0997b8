//! Discovery of installations in the reference tree.
//!
//! # Layout
//!
//! ```text
//! <root>/
//! └── <unit>/
//!     └── <version>/
//!         ├── 20250612_081502UTC/          # first attempt
//!         │   └── easybuild/
//!         │       ├── easybuild-<unit>-<version>-<stamp>.log.bz2
//!         │       ├── <unit>-<version>.eb
//!         │       └── reprod/easyblocks/*.py
//!         └── 20250903_140011UTC/          # rebuild
//! ```
//!
//! Attempt directory names sort lexicographically in chronological order, so
//! the first and last entries are the first and last attempts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::ReplayConfig;
use crate::consts::{ATTEMPT_DIR_FORMAT, ATTEMPT_LOG_SUBDIR, EASYBLOCKS_GLOB, EASYCONFIG_EXT, LOG_FILE_EXT, LOG_FILE_PREFIX};
use crate::log::{self, Compression, LogError};
use crate::registry::BuildRecord;

/// Errors that can occur while crawling the reference tree.
#[derive(Debug, Error)]
pub enum CrawlError {
  /// A directory of the tree could not be listed.
  #[error("failed to list {path}: {message}")]
  ListDir { path: PathBuf, message: String },

  /// A log glob matched zero or several files.
  #[error("expected exactly one file to match {pattern}, found {}: {matches:?}", .matches.len())]
  AmbiguousArtifact { pattern: String, matches: Vec<PathBuf> },

  /// A version directory holds no attempt.
  #[error("no build attempts found for {unit}-{version} in {path}")]
  NoAttempts {
    unit: String,
    version: String,
    path: PathBuf,
  },

  /// An attempt directory name does not follow the timestamp convention.
  #[error("attempt directory {path} is not named {format}")]
  InvalidAttemptName { path: PathBuf, format: &'static str },

  /// A build log could not be parsed.
  #[error("{unit}-{version}: {source}")]
  Log {
    unit: String,
    version: String,
    #[source]
    source: LogError,
  },
}

/// Time the bootstrap unit is pinned to, earlier than any real build.
pub fn sentinel_epoch() -> NaiveDateTime {
  DateTime::<Utc>::UNIX_EPOCH.naive_utc()
}

/// Parse an attempt directory name into the time the attempt started.
pub fn parse_attempt_time(name: &str) -> Option<NaiveDateTime> {
  NaiveDateTime::parse_from_str(name, ATTEMPT_DIR_FORMAT).ok()
}

/// List the subdirectories of `dir` in lexicographic order.
fn list_subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>, CrawlError> {
  let mut dirs = Vec::new();
  let walker = WalkDir::new(dir)
    .min_depth(1)
    .max_depth(1)
    .follow_links(true)
    .sort_by_file_name();

  for entry in walker {
    let entry = entry.map_err(|e| CrawlError::ListDir {
      path: dir.to_path_buf(),
      message: e.to_string(),
    })?;
    if !entry.file_type().is_dir() {
      continue;
    }
    let name = entry.file_name().to_string_lossy().into_owned();
    dirs.push((name, entry.into_path()));
  }

  Ok(dirs)
}

/// List the unit names present under the tree root.
pub fn list_units(root: &Path) -> Result<Vec<String>, CrawlError> {
  Ok(list_subdirs(root)?.into_iter().map(|(name, _)| name).collect())
}

/// Whether `name` is a build log of `unit`, i.e. matches
/// `easybuild-<unit>-*.log` with an optional compression suffix.
fn is_unit_log(name: &str, prefix: &str) -> bool {
  let Some(rest) = name.strip_prefix(prefix) else {
    return false;
  };
  Compression::ALL
    .iter()
    .any(|c| rest.ends_with(&format!("{}{}", LOG_FILE_EXT, c.suffix())))
}

/// Locate the single build log of `unit` inside an attempt directory.
///
/// Zero or several candidates are an error.
pub fn find_log(attempt_dir: &Path, unit: &str) -> Result<PathBuf, CrawlError> {
  let log_dir = attempt_dir.join(ATTEMPT_LOG_SUBDIR);
  let prefix = format!("{}{}-", LOG_FILE_PREFIX, unit);
  let pattern = log_dir.join(format!("{}*{}{{,.bz2,.gz}}", prefix, LOG_FILE_EXT));

  let entries = match fs::read_dir(&log_dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      return Err(CrawlError::AmbiguousArtifact {
        pattern: pattern.display().to_string(),
        matches: Vec::new(),
      });
    }
    Err(e) => {
      return Err(CrawlError::ListDir {
        path: log_dir,
        message: e.to_string(),
      });
    }
  };

  let mut matches = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|e| CrawlError::ListDir {
      path: log_dir.clone(),
      message: e.to_string(),
    })?;
    let path = entry.path();
    if path.is_file() && is_unit_log(&entry.file_name().to_string_lossy(), &prefix) {
      matches.push(path);
    }
  }
  matches.sort();

  match <[PathBuf; 1]>::try_from(matches) {
    Ok([log]) => Ok(log),
    Err(matches) => Err(CrawlError::AmbiguousArtifact {
      pattern: pattern.display().to_string(),
      matches,
    }),
  }
}

/// Crawl every version of one unit.
///
/// Returns an empty list when `unit` is not a directory under the root.
pub fn crawl_unit(unit: &str, config: &ReplayConfig) -> Result<Vec<BuildRecord>, CrawlError> {
  let unit_dir = config.root.join(unit);
  if !unit_dir.is_dir() {
    return Ok(Vec::new());
  }

  let mut records = Vec::new();
  for (version, version_dir) in list_subdirs(&unit_dir)? {
    records.push(crawl_version(unit, &version, &version_dir, config)?);
  }
  Ok(records)
}

fn crawl_version(unit: &str, version: &str, version_dir: &Path, config: &ReplayConfig) -> Result<BuildRecord, CrawlError> {
  let attempts = list_subdirs(version_dir)?;
  let (Some((_, first_dir)), Some((_, last_dir))) = (attempts.first(), attempts.last()) else {
    return Err(CrawlError::NoAttempts {
      unit: unit.to_string(),
      version: version.to_string(),
      path: version_dir.to_path_buf(),
    });
  };

  let log_err = |source| CrawlError::Log {
    unit: unit.to_string(),
    version: version.to_string(),
    source,
  };

  let mut attempt_times = Vec::with_capacity(attempts.len());
  for (name, dir) in &attempts {
    let time = parse_attempt_time(name).ok_or_else(|| CrawlError::InvalidAttemptName {
      path: dir.clone(),
      format: ATTEMPT_DIR_FORMAT,
    })?;
    attempt_times.push(time);
  }
  let mut initial_build_time = attempt_times[0];
  let first_log = find_log(first_dir, unit)?;

  let (build_duration, builder_version) = match config.bootstrap_for(unit) {
    Some(bootstrap) => {
      // The tool reports whichever version happened to run it, not the one
      // intended to bootstrap it.
      initial_build_time = sentinel_epoch();
      let span = log::read_span(&first_log).map_err(log_err)?;
      (span.duration(), bootstrap.to_string())
    }
    None if first_dir == last_dir => {
      let summary = log::extract(&first_log).map_err(log_err)?;
      (summary.span.duration(), summary.builder_version)
    }
    None => {
      let span = log::read_span(&first_log).map_err(log_err)?;
      let last_log = find_log(last_dir, unit)?;
      let builder = log::read_builder_version(&last_log).map_err(log_err)?;
      (span.duration(), builder)
    }
  };

  let last_log_dir = last_dir.join(ATTEMPT_LOG_SUBDIR);
  let record = BuildRecord {
    unit_name: unit.to_string(),
    unit_version: version.to_string(),
    initial_build_time,
    build_duration,
    builder_version,
    artifact_ref: last_log_dir
      .join(format!("{}-{}{}", unit, version, EASYCONFIG_EXT))
      .display()
      .to_string(),
    extension_ref: last_log_dir.join(EASYBLOCKS_GLOB).display().to_string(),
  };

  debug!(
    unit,
    version,
    attempts = attempts.len(),
    initial_build_time = %record.initial_build_time,
    duration_secs = record.build_duration.as_secs(),
    builder = %record.builder_version,
    "crawled installation"
  );

  Ok(record)
}
