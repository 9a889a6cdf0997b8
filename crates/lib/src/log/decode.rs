//! Transparent decompression of build logs.
//!
//! Logs are read strictly forward; none of the supported encodings can be
//! seeked, so every consumer streams from the start.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;

/// Compression applied to a log file, detected from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
  Bzip2,
  Gzip,
  None,
}

impl Compression {
  /// All supported compressions, in the order their suffixes are tried.
  pub const ALL: [Compression; 3] = [Compression::Bzip2, Compression::Gzip, Compression::None];

  /// File name suffix appended after `.log`.
  pub fn suffix(self) -> &'static str {
    match self {
      Compression::Bzip2 => ".bz2",
      Compression::Gzip => ".gz",
      Compression::None => "",
    }
  }

  /// Detect the compression of `path` from its extension.
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|e| e.to_str()) {
      Some("bz2") => Compression::Bzip2,
      Some("gz") => Compression::Gzip,
      _ => Compression::None,
    }
  }
}

/// Open `path` as a buffered, decompressed line stream.
pub fn open_log(path: &Path) -> io::Result<Box<dyn BufRead>> {
  let file = File::open(path)?;
  let reader: Box<dyn BufRead> = match Compression::from_path(path) {
    Compression::Bzip2 => Box::new(BufReader::new(MultiBzDecoder::new(file))),
    Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
    Compression::None => Box::new(BufReader::new(file)),
  };
  Ok(reader)
}
