//! Build log extraction.
//!
//! A build log records one installation attempt. Every line starts with a
//! timestamp marker such as:
//!
//! ```text
//! == 2025-10-30 12:59:09,573 build_log.py:267 INFO This is EasyBuild 4.9.4 (framework: 4.9.4, ...)
//! ...
//! == 2025-10-30 14:29:09,573 easyblock.py:4321 INFO Build succeeded
//! ```
//!
//! The first and last timestamps bound the build's duration and the first
//! line names the builder version. Logs are compressed, so they are streamed
//! once; only the first and the most recent line are retained.

pub mod decode;

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

pub use decode::{Compression, open_log};

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"==\s+([0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}),([0-9]+)").expect("valid timestamp regex")
});

static MARKER_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"This is EasyBuild ([0-9]+\.[0-9]+\.[0-9]+)").expect("valid marker regex"));

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur while reading a build log.
#[derive(Debug, Error)]
pub enum LogError {
  /// The log could not be opened or decompressed.
  #[error("failed to read log {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The log lacks a timestamp where one is required.
  #[error("malformed log {path}: {reason}")]
  MalformedLog { path: PathBuf, reason: String },

  /// The first line of the log does not name the builder version.
  #[error("no builder version marker in first line of {path}: {line:?}")]
  MissingMarker { path: PathBuf, line: String },
}

/// Start and end of a build, taken from the first and last log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSpan {
  pub start: NaiveDateTime,
  pub end: NaiveDateTime,
}

impl LogSpan {
  /// Elapsed time between the first and last log line.
  pub fn duration(&self) -> Duration {
    // Non-negative by construction, see `span_from_lines`.
    (self.end - self.start).to_std().unwrap_or_default()
  }
}

/// Everything a single log reveals about its attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSummary {
  pub span: LogSpan,
  pub builder_version: String,
}

/// First and last line of a log.
struct Ends {
  first: String,
  last: String,
}

/// Stream `reader` once, keeping only the first and the latest line.
fn scan_ends(mut reader: impl BufRead) -> io::Result<Option<Ends>> {
  let mut buf = Vec::new();
  let mut first: Option<Vec<u8>> = None;
  let mut last = Vec::new();

  loop {
    buf.clear();
    if reader.read_until(b'\n', &mut buf)? == 0 {
      break;
    }
    trim_newline(&mut buf);
    if first.is_none() {
      first = Some(buf.clone());
    }
    std::mem::swap(&mut last, &mut buf);
  }

  Ok(first.map(|first| Ends {
    first: String::from_utf8_lossy(&first).into_owned(),
    last: String::from_utf8_lossy(&last).into_owned(),
  }))
}

fn trim_newline(buf: &mut Vec<u8>) {
  while matches!(buf.last(), Some(b'\n' | b'\r')) {
    buf.pop();
  }
}

/// Parse the timestamp marker of a log line.
///
/// Returns `None` when the line carries no marker. The fractional part is
/// read as a decimal fraction of a second, so `,573` is 573 milliseconds.
pub fn parse_timestamp(line: &str) -> Option<NaiveDateTime> {
  let caps = TIMESTAMP_RE.captures(line)?;
  let whole = NaiveDateTime::parse_from_str(&caps[1], TIMESTAMP_FORMAT).ok()?;

  let digits: String = caps[2].chars().take(9).collect();
  let nanos: i64 = format!("{:0<9}", digits).parse().ok()?;
  Some(whole + TimeDelta::nanoseconds(nanos))
}

/// Extract the builder version named in a log line.
pub fn parse_builder_version(line: &str) -> Option<&str> {
  MARKER_RE.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str())
}

fn span_from_lines(path: &Path, ends: &Ends) -> Result<LogSpan, LogError> {
  let timestamp = |line: &str, which: &str| {
    parse_timestamp(line).ok_or_else(|| LogError::MalformedLog {
      path: path.to_path_buf(),
      reason: format!("{} line has no timestamp: {:?}", which, line),
    })
  };

  let start = timestamp(&ends.first, "first")?;
  let end = timestamp(&ends.last, "last")?;
  if end < start {
    return Err(LogError::MalformedLog {
      path: path.to_path_buf(),
      reason: format!("last timestamp {} precedes first timestamp {}", end, start),
    });
  }

  Ok(LogSpan { start, end })
}

fn version_from_line(path: &Path, line: &str) -> Result<String, LogError> {
  parse_builder_version(line)
    .map(str::to_string)
    .ok_or_else(|| LogError::MissingMarker {
      path: path.to_path_buf(),
      line: line.to_string(),
    })
}

fn read_ends(path: &Path) -> Result<Ends, LogError> {
  let read_err = |source| LogError::Read {
    path: path.to_path_buf(),
    source,
  };

  let reader = open_log(path).map_err(read_err)?;
  scan_ends(reader).map_err(read_err)?.ok_or_else(|| LogError::MalformedLog {
    path: path.to_path_buf(),
    reason: "log is empty".to_string(),
  })
}

/// Read the build span of a log.
///
/// Streams the whole log once.
pub fn read_span(path: &Path) -> Result<LogSpan, LogError> {
  let ends = read_ends(path)?;
  let span = span_from_lines(path, &ends)?;
  debug!(path = %path.display(), start = %span.start, end = %span.end, "read log span");
  Ok(span)
}

/// Read the builder version from the first line of a log.
///
/// Only the first line is decompressed.
pub fn read_builder_version(path: &Path) -> Result<String, LogError> {
  let read_err = |source| LogError::Read {
    path: path.to_path_buf(),
    source,
  };

  let mut reader = open_log(path).map_err(read_err)?;
  let mut buf = Vec::new();
  reader.read_until(b'\n', &mut buf).map_err(read_err)?;
  trim_newline(&mut buf);

  version_from_line(path, &String::from_utf8_lossy(&buf))
}

/// Read span and builder version of a log in a single pass.
pub fn extract(path: &Path) -> Result<LogSummary, LogError> {
  let ends = read_ends(path)?;
  let span = span_from_lines(path, &ends)?;
  let builder_version = version_from_line(path, &ends.first)?;
  Ok(LogSummary { span, builder_version })
}
