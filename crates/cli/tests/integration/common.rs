//! Shared test helpers for CLI integration tests.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use bzip2::Compression;
use bzip2::write::BzEncoder;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding a reference log tree
/// and an output directory for manifests.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("reprod")).unwrap();
    fs::create_dir_all(temp.path().join("out")).unwrap();
    Self { temp }
  }

  /// Root of the reference log tree.
  pub fn root(&self) -> PathBuf {
    self.temp.path().join("reprod")
  }

  /// Directory manifests are written to.
  pub fn out(&self) -> PathBuf {
    self.temp.path().join("out")
  }

  /// Add one installation attempt with a bzip2-compressed build log.
  ///
  /// `attempt` is the directory name (`%Y%m%d_%H%M%SUTC`); `start` and `end`
  /// are the first and last log timestamps (`%Y-%m-%d %H:%M:%S`).
  pub fn add_attempt(&self, unit: &str, version: &str, attempt: &str, start: &str, end: &str, builder: &str) {
    let log_dir = self.root().join(unit).join(version).join(attempt).join("easybuild");
    fs::create_dir_all(&log_dir).unwrap();

    let content = format!(
      "== {start},573 build_log.py:267 INFO This is EasyBuild {builder} (framework: {builder}, easyblocks: {builder})\n\
       == {start},600 easyblock.py:371 INFO building\n\
       == {end},573 easyblock.py:4321 INFO Build succeeded for 1 out of 1\n"
    );
    let log = fs::File::create(log_dir.join(format!("easybuild-{unit}-{version}-{attempt}.log.bz2"))).unwrap();
    let mut encoder = BzEncoder::new(log, Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();

    fs::write(log_dir.join(format!("{unit}-{version}.eb")), "easyblock = 'ConfigureMake'\n").unwrap();
  }

  /// Lay out a small tree: three installs with EasyBuild 4.9.4, one rebuilt
  /// with 5.1.1, and EasyBuild itself.
  pub fn with_sample_tree() -> Self {
    let env = Self::new();
    env.add_attempt("zlib", "1.3.1", "20250101_100000UTC", "2025-01-01 10:00:00", "2025-01-01 11:00:00", "4.9.4");
    env.add_attempt("GCC", "13.2.0", "20250101_110000UTC", "2025-01-01 11:00:00", "2025-01-01 11:50:00", "4.9.4");
    env.add_attempt("Python", "3.12.3", "20250101_123000UTC", "2025-01-01 12:30:00", "2025-01-01 13:00:00", "4.9.4");
    env.add_attempt("Python", "3.12.3", "20250301_090000UTC", "2025-03-01 09:00:00", "2025-03-01 10:30:00", "5.1.1");
    env.add_attempt("EasyBuild", "5.1.1", "20250201_080000UTC", "2025-02-01 08:00:00", "2025-02-01 08:05:00", "5.1.1");
    env
  }

  /// Names of the files written to the output directory, sorted.
  pub fn written(&self) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(self.out())
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect();
    names.sort();
    names
  }

  /// Read a file from the output directory.
  pub fn read_output(&self, name: &str) -> String {
    fs::read_to_string(self.out().join(name)).unwrap()
  }

  /// A restack command pointed at this environment's tree.
  pub fn restack_cmd(&self, subcommand: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("restack");
    cmd.env("RUST_LOG", "warn");
    cmd.arg(subcommand);
    cmd.args(["--generation", "2025.06", "--root"]);
    cmd.arg(self.root());
    cmd
  }
}

/// Path of `name` inside `dir` as written in manifest entries.
pub fn display_path(dir: &Path, parts: &[&str]) -> String {
  let mut path = dir.to_path_buf();
  for part in parts {
    path.push(part);
  }
  path.display().to_string()
}
