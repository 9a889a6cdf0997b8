use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn inspect_lists_installations_chronologically() {
  let env = TestEnv::with_sample_tree();

  let assert = env.restack_cmd("inspect").assert().success();
  let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();

  let position = |needle: &str| stdout.find(needle).unwrap_or_else(|| panic!("{needle} missing from {stdout}"));
  assert!(position("zlib-1.3.1") < position("GCC-13.2.0"));
  assert!(position("GCC-13.2.0") < position("Python-3.12.3"));
  assert!(position("Python-3.12.3") < position("EasyBuild-5.1.1"));
}

#[test]
fn inspect_json_reports_rebuild_builder() {
  let env = TestEnv::with_sample_tree();

  let assert = env.restack_cmd("inspect").args(["-f", "json"]).assert().success();
  let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  let records = json.as_array().unwrap();

  assert_eq!(records.len(), 4);
  let python = records.iter().find(|r| r["unit"] == "Python").unwrap();
  assert_eq!(python["builder_version"], "5.1.1");
  assert_eq!(python["build_minutes"], 30);
  assert_eq!(python["initial_build_time"], "2025-01-01 12:30:00");
}

#[test]
fn inspect_missing_root_fails() {
  let env = TestEnv::new();

  cargo_bin_cmd!("restack")
    .args(["inspect", "--generation", "2025.06", "--root"])
    .arg(env.temp.path().join("absent"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to list"));
}
