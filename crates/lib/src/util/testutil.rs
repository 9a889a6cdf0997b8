//! Test utilities for restack-lib.
//!
//! Helpers that lay out a reference installation tree on disk with
//! compressed build logs, the way the build host leaves it behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use std::time::Duration;

use bzip2::write::BzEncoder;
use chrono::NaiveDateTime;
use flate2::write::GzEncoder;

use crate::log::Compression;
use crate::registry::BuildRecord;

/// Write `lines` to `path`, compressed according to its extension.
pub fn write_log(path: &Path, lines: &[&str]) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  let mut content = String::new();
  for line in lines {
    content.push_str(line);
    content.push('\n');
  }

  let file = File::create(path).unwrap();
  match Compression::from_path(path) {
    Compression::Bzip2 => {
      let mut enc = BzEncoder::new(file, bzip2::Compression::default());
      enc.write_all(content.as_bytes()).unwrap();
      enc.finish().unwrap();
    }
    Compression::Gzip => {
      let mut enc = GzEncoder::new(file, flate2::Compression::default());
      enc.write_all(content.as_bytes()).unwrap();
      enc.finish().unwrap();
    }
    Compression::None => {
      let mut file = file;
      file.write_all(content.as_bytes()).unwrap();
    }
  }
}

/// Format a log line carrying the timestamp marker.
pub fn log_line(timestamp: &str, message: &str) -> String {
  format!("== {},000 build_log.py:267 INFO {}", timestamp, message)
}

/// One attempt to lay out in a reference tree.
pub struct Attempt<'a> {
  /// Attempt directory name, e.g. `20251030_125909UTC`.
  pub dir: &'a str,
  /// First log timestamp, e.g. `2025-10-30 12:59:09`.
  pub start: &'a str,
  /// Last log timestamp.
  pub end: &'a str,
  /// Builder version named on the first log line.
  pub builder: &'a str,
}

/// Create `<root>/<unit>/<version>/<attempt>/easybuild/` with one bz2 log.
///
/// Returns the attempt directory.
pub fn make_attempt(root: &Path, unit: &str, version: &str, attempt: &Attempt<'_>) -> PathBuf {
  let attempt_dir = root.join(unit).join(version).join(attempt.dir);
  let log_dir = attempt_dir.join("easybuild");
  let first = log_line(attempt.start, &format!("This is EasyBuild {} (framework: {})", attempt.builder, attempt.builder));
  let last = log_line(attempt.end, "Build succeeded for 1 out of 1");
  write_log(
    &log_dir.join(format!("easybuild-{}-{}-{}.log.bz2", unit, version, attempt.dir)),
    &[first.as_str(), "  building...", last.as_str()],
  );
  fs::write(log_dir.join(format!("{}-{}.eb", unit, version)), "name = 'x'\n").unwrap();
  attempt_dir
}

/// Build an in-memory record starting at `time` (`%Y-%m-%d %H:%M`).
pub fn record(unit: &str, time: &str, minutes: u64, builder: &str) -> BuildRecord {
  BuildRecord {
    unit_name: unit.to_string(),
    unit_version: "1.0".to_string(),
    initial_build_time: NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M").unwrap(),
    build_duration: Duration::from_secs(minutes * 60),
    builder_version: builder.to_string(),
    artifact_ref: format!("/reprod/{}/1.0/easybuild/{}-1.0.eb", unit, unit),
    extension_ref: format!("/reprod/{}/1.0/easybuild/reprod/easyblocks/*.py", unit),
  }
}
