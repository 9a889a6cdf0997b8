use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn plan_lists_batches_without_writing() {
  let env = TestEnv::with_sample_tree();

  env
    .restack_cmd("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("easystack-001-eb-4.9.4.yml (EasyBuild 4.9.4, 1h 50m)"))
    .stdout(predicate::str::contains("easystack-002-eb-5.1.1.yml (EasyBuild 5.1.1, 35m)"))
    .stdout(predicate::str::contains("zlib-1.3.1 (1h 0m)"));

  assert!(env.written().is_empty());
}

#[test]
fn plan_json_output_is_valid() {
  let env = TestEnv::with_sample_tree();

  let assert = env
    .restack_cmd("plan")
    .args(["-m", "100", "-f", "json"])
    .assert()
    .success();

  let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  let batches = json.as_array().unwrap();
  assert_eq!(batches.len(), 3);
  assert_eq!(batches[0]["sequence"], 1);
  assert_eq!(batches[0]["entries"][0]["unit"], "zlib");
  assert_eq!(batches[2]["builder_version"], "5.1.1");
  assert_eq!(batches[2]["total_minutes"], 35);
}

#[test]
fn plan_accepts_humantime_budget() {
  let env = TestEnv::with_sample_tree();

  let assert = env
    .restack_cmd("plan")
    .args(["-m", "1h 40m", "-f", "json"])
    .assert()
    .success();

  let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  assert_eq!(json.as_array().unwrap().len(), 3);
}

#[test]
fn plan_rejects_invalid_budget() {
  let env = TestEnv::with_sample_tree();

  env
    .restack_cmd("plan")
    .args(["-m", "forever"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid duration"));
}

#[test]
fn plan_accepts_original_short_flags() {
  let env = TestEnv::with_sample_tree();

  let assert = env
    .restack_cmd("plan")
    .args(["--max-build-time", "240", "-o", "4.9.4", "-f", "json"])
    .assert()
    .success();

  let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  let batches = json.as_array().unwrap();
  assert_eq!(batches.len(), 2);
  assert_eq!(batches[0]["entries"][0]["unit"], "EasyBuild");
  assert_eq!(batches[0]["total_minutes"], 115);
}

#[test]
fn plan_rejects_oversized_budget() {
  let env = TestEnv::with_sample_tree();

  env
    .restack_cmd("plan")
    .args(["-m", "307445734561825862"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("too large"));
}
