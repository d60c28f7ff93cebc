//! Integration tests for the paperboard CLI commands.
//!
//! Only commands that stay off the network are exercised. Tests run in serial and each one
//! works in its own temporary config and database.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::{tempdir, TempDir};

/// Temporary config and database locations.
struct TestEnv {
  _dir:   TempDir,
  config: PathBuf,
  db:     PathBuf,
}

fn test_env() -> TestEnv {
  let dir = tempdir().unwrap();
  let config = dir.path().join("config.toml");
  let db = dir.path().join("test.db");
  TestEnv { _dir: dir, config, db }
}

// Helper function to create a command bound to the test environment
fn paperboard(env: &TestEnv) -> Command {
  let mut cmd = Command::cargo_bin("paperboard").unwrap();
  cmd.arg("--config").arg(&env.config).arg("--path").arg(&env.db).arg("--accept-defaults");
  cmd
}

fn init_for(env: &TestEnv, user: &str) {
  paperboard(env).args(["init", "--user", user]).assert().success();
}

fn last_word(stdout: &[u8]) -> String {
  String::from_utf8_lossy(stdout).trim().rsplit(' ').next().unwrap().to_string()
}

#[test]
fn test_help() {
  Command::cargo_bin("paperboard")
    .unwrap()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Track, tag and digest arXiv papers"))
    .stdout(predicate::str::contains("reading-list"));
}

#[test]
#[serial]
fn test_init_and_clean() {
  let env = test_env();

  paperboard(&env)
    .args(["init", "--user", "alice", "--page-size", "5"])
    .assert()
    .success()
    .stdout(predicate::str::contains("initialized successfully"));

  assert!(env.db.exists());
  let config = std::fs::read_to_string(&env.config).unwrap();
  assert!(config.contains("user_id = \"alice\""));
  assert!(config.contains("digest_page_size = 5"));

  paperboard(&env)
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Database files cleaned"));
  assert!(!env.db.exists());

  paperboard(&env)
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("No database found"));
}

#[test]
#[serial]
fn test_init_rejects_invalid_page_size() {
  let env = test_env();
  paperboard(&env)
    .args(["init", "--page-size", "0"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("digest_page_size must be at least 1"));
  assert!(!env.config.exists());
}

#[test]
#[serial]
fn test_user_required() {
  let env = test_env();
  paperboard(&env).arg("init").assert().success().stdout(predicate::str::contains("No user set"));

  paperboard(&env)
    .args(["queries", "list"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("No user configured"));

  // A user on the command line is enough
  paperboard(&env)
    .args(["queries", "list", "--user", "bob"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No saved queries"));
}

#[test]
#[serial]
fn test_queries_workflow() {
  let env = test_env();
  init_for(&env, "alice");

  let output = paperboard(&env)
    .args(["queries", "save", "Agents", "all:agent AND cat:cs.AI"])
    .output()
    .unwrap();
  assert!(output.status.success());
  assert!(String::from_utf8_lossy(&output.stdout).contains("Saved query \"Agents\""));
  let id = last_word(&output.stdout);

  paperboard(&env)
    .args(["queries", "list"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Agents"))
    .stdout(predicate::str::contains("all:agent AND cat:cs.AI"))
    .stdout(predicate::str::contains(id.as_str()));

  // Another user cannot see or delete it
  paperboard(&env).args(["queries", "delete", &id, "--user", "mallory"]).assert().failure();

  paperboard(&env)
    .args(["queries", "delete", &id])
    .assert()
    .success()
    .stdout(predicate::str::contains("Deleted query"));
  paperboard(&env)
    .args(["queries", "list"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No saved queries"));
  paperboard(&env)
    .args(["queries", "delete", &id])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Not found"));

  paperboard(&env)
    .args(["queries", "save", "  ", "all:x"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid input"));
}

#[test]
#[serial]
fn test_tags_workflow() {
  let env = test_env();
  init_for(&env, "alice");

  let output = paperboard(&env).args(["tags", "add", "2301.07041v2", "ml"]).output().unwrap();
  assert!(output.status.success());
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Tagged 2301.07041 with \"ml\""));
  assert!(stdout.contains("bg-green-100 text-green-800"));
  let id = last_word(&output.stdout);

  paperboard(&env)
    .args(["tags", "add", "2301.07041", "ml"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Tag already exists for this paper"));

  // A name used before keeps its color on other papers
  paperboard(&env)
    .args(["tags", "add", "2401.00002", "ml"])
    .assert()
    .success()
    .stdout(predicate::str::contains("bg-green-100 text-green-800"));

  paperboard(&env)
    .args(["tags", "summary"])
    .assert()
    .success()
    .stdout(predicate::str::contains("ml"))
    .stdout(predicate::str::contains("[bg-green-100 text-green-800]"));

  paperboard(&env)
    .args(["tags", "list", "2301.07041"])
    .assert()
    .success()
    .stdout(predicate::str::contains(id.as_str()));

  paperboard(&env).args(["tags", "remove", &id]).assert().success();
  paperboard(&env)
    .args(["tags", "list", "2301.07041"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No tags on 2301.07041"));
}

#[test]
#[serial]
fn test_reading_list_workflow() {
  let env = test_env();
  init_for(&env, "alice");

  paperboard(&env)
    .args(["reading-list", "add", "2301.07041"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Added 2301.07041 to the reading list"));
  paperboard(&env)
    .args(["reading-list", "add", "2301.07041v3"])
    .assert()
    .success()
    .stdout(predicate::str::contains("already on the reading list"));
  paperboard(&env)
    .args(["reading-list", "check", "2301.07041"])
    .assert()
    .success()
    .stdout(predicate::str::contains("2301.07041 is on the reading list"));

  paperboard(&env)
    .args(["tags", "summary"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Reading List"));

  paperboard(&env)
    .args(["reading-list", "remove", "2301.07041"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed 2301.07041 from the reading list"));
  paperboard(&env)
    .args(["reading-list", "check", "2301.07041"])
    .assert()
    .success()
    .stdout(predicate::str::contains("is not on the reading list"));
  paperboard(&env)
    .args(["reading-list", "list"])
    .assert()
    .success()
    .stdout(predicate::str::contains("empty"));
}

#[test]
#[serial]
fn test_digests_workflow() {
  let env = test_env();
  init_for(&env, "alice");

  let output = paperboard(&env)
    .args([
      "digests",
      "create",
      "ML",
      "--topic",
      "cs.LG",
      "--topic",
      "cs.AI",
      "--description",
      "Learning",
    ])
    .output()
    .unwrap();
  assert!(output.status.success());
  let id = last_word(&output.stdout);

  paperboard(&env)
    .args(["digests", "list"])
    .assert()
    .success()
    .stdout(predicate::str::contains("ML"))
    .stdout(predicate::str::contains("Topics: cs.LG, cs.AI"))
    .stdout(predicate::str::contains("Learning"));

  paperboard(&env)
    .args(["digests", "update", &id, "Machine Learning", "--topic", "cs.LG"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Updated digest \"Machine Learning\""));

  paperboard(&env)
    .args(["digests", "show", "Machine Learning", "--date", "2024-01-05"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No matches"));
  paperboard(&env)
    .args(["digests", "show", "Machine Learning", "--date", "2024-01-05", "--json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"totalPages\": 0"))
    .stdout(predicate::str::contains("\"currentPage\": 1"));

  paperboard(&env).args(["digests", "delete", &id, "--user", "mallory"]).assert().failure();
  paperboard(&env).args(["digests", "delete", &id]).assert().success();
  paperboard(&env)
    .args(["digests", "list"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No digests yet"));
}

#[test]
fn test_invalid_date_rejected() {
  let env = test_env();
  paperboard(&env)
    .args(["digests", "show", "ML", "--date", "05/01/2024", "--user", "alice"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid value"));
}
