#![cfg(unix)]

use predicates::prelude::*;

#[test]
fn runs_clean_build_then_incremental_build() {
  let fixture = test_support::fixture_project();
  let out = fixture
    .command("e2erun000001")
    .args(["--tasks", "build", "--git-branch", "main"])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let calls = fixture.gradle_invocations();
  assert_eq!(calls.len(), 2, "exactly two builds: {calls:?}");
  assert!(calls[0].starts_with("--no-build-cache -Dscan.tag.exp1-gradle -Dscan.tag.e2erun000001"));
  assert!(calls[0].ends_with("clean build"));
  assert!(calls[1].starts_with("--no-build-cache"));
  assert!(!calls[1].contains("clean"));
  assert!(calls[1].contains("-Dscan.value.runNum=2"));

  let stdout = String::from_utf8_lossy(&out.stdout);
  assert!(stdout.contains("Project:                  widgets"));
  assert!(stdout.contains("Build scan first build:   https://ge.example.com/s/scan1"));
  assert!(stdout.contains("Build scan second build:  https://ge.example.com/s/scan2"));
  assert!(stdout.contains("https://ge.example.com/s/scan2/performance/execution"));
  assert!(stdout.contains("https://ge.example.com/s/scan2/timeline?outcome=SUCCESS,FAILED&sort=longest"));
  assert!(stdout.contains("https://ge.example.com/c/scan1/scan2/task-inputs"));
}

#[test]
fn run_artifacts_are_persisted() {
  let fixture = test_support::fixture_project();
  fixture
    .command("artrun000001")
    .args(["--tasks", "build"])
    .assert()
    .success();

  let run_dir = fixture.run_dir("artrun000001").expect("run dir");
  assert!(run_dir.join("widgets/settings.gradle").exists(), "project is cloned into the run dir");
  assert!(std::fs::read_to_string(run_dir.join("build-1.log")).unwrap().contains("/s/scan1"));
  assert!(std::fs::read_to_string(run_dir.join("build-2.log")).unwrap().contains("/s/scan2"));

  let v = fixture.experiment_json("artrun000001");
  assert_eq!(v["run_id"], "artrun000001");
  assert_eq!(v["config"]["project_name"], "widgets");
  assert_eq!(v["scans"][0]["scan_id"], "scan1");
  assert_eq!(v["scans"][1]["scan_id"], "scan2");
  assert_eq!(v["commit_id"].as_str().map(str::len), Some(40));
}

#[test]
fn ledger_is_appended_across_runs() {
  let fixture = test_support::fixture_project();
  for run_id in ["ledger000001", "ledger000002"] {
    fixture.command(run_id).args(["--tasks", "build"]).assert().success();
  }

  let text = std::fs::read_to_string(fixture.ledger()).unwrap();
  let lines: Vec<&str> = text.lines().collect();
  assert_eq!(lines.len(), 5, "header + two rows per run: {text}");
  assert!(lines[0].starts_with("timestamp,run_id,run_num"));
  assert!(lines[1].contains(",ledger000001,1,widgets,"));
  assert!(lines[2].contains(",ledger000001,2,widgets,"));
  assert!(lines[3].contains(",ledger000002,1,") && lines[3].ends_with("/s/scan3"));
  assert!(lines[4].contains(",ledger000002,2,") && lines[4].ends_with("/s/scan4"));
}

#[test]
fn project_dir_selects_nested_build() {
  let fixture = test_support::fixture_project();
  fixture
    .command("nested000001")
    .args(["--tasks", "assemble", "--project-dir", "nested", "--args", "--offline"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Project dir:              nested"));

  let calls = fixture.gradle_invocations();
  assert_eq!(calls.len(), 2);
  assert!(calls[0].ends_with("clean assemble --offline"));
  assert!(calls[1].ends_with("assemble --offline"));
}

#[test]
fn ge_server_is_passed_to_both_builds() {
  let fixture = test_support::fixture_project();
  fixture
    .command("gerun0000001")
    .env("FAKE_GRADLE_SCAN_BASE", "https://ge.example.org")
    .args(["--tasks", "build", "--enable-ge", "--ge-server", "https://ge.example.org"])
    .assert()
    .success()
    .stdout(predicate::str::contains("https://ge.example.org/c/scan1/scan2/task-inputs"));

  for call in fixture.gradle_invocations() {
    assert!(call.contains("--scan -Dgradle.enterprise.url=https://ge.example.org"), "{call}");
  }
}

#[test]
fn relative_repo_path_resolves_against_working_dir() {
  let fixture = test_support::fixture_project();
  let root = fixture.repo().parent().unwrap().to_path_buf();
  let data_dir = fixture.data_dir();
  test_support::cmd_bin(test_support::BIN)
    .current_dir(&root)
    .env("FAKE_GRADLE_LOG", fixture.gradle_log())
    .args(["--git-repo", "widgets", "--tasks", "build", "--run-id", "relrun000001"])
    .args(["--data-dir", data_dir.to_str().unwrap()])
    .assert()
    .success()
    .stdout(predicate::str::contains("Project:                  widgets"));

  assert_eq!(fixture.gradle_invocations().len(), 2);
  let v = fixture.experiment_json("relrun000001");
  let recorded = v["config"]["git_repo"].as_str().unwrap();
  assert!(std::path::Path::new(recorded).is_absolute(), "{recorded}");
}

#[test]
fn dotted_repo_path_keeps_earlier_runs() {
  let fixture = test_support::fixture_project();
  fixture.command("dotrun000001").args(["--tasks", "build"]).assert().success();
  let first_run = fixture.run_dir("dotrun000001").expect("run dir");

  let dotted = fixture.repo().join("nested").join("..");
  fixture
    .command_with_repo("dotrun000002", dotted.to_str().unwrap())
    .args(["--tasks", "build"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Project:                  widgets"));

  assert!(first_run.join("experiment.json").exists());
  let ledger = std::fs::read_to_string(fixture.ledger()).unwrap();
  assert_eq!(ledger.lines().count(), 5, "{ledger}");
}

#[test]
fn dotted_remote_name_is_rejected_before_any_side_effect() {
  let fixture = test_support::fixture_project();
  fixture.command("dotrun000003").args(["--tasks", "build"]).assert().success();

  fixture
    .command_with_repo("dotrun000004", "https://example.invalid/acme/..")
    .args(["--tasks", "build"])
    .assert()
    .failure()
    .code(2)
    .stderr(predicate::str::contains("--git-repo"));

  assert!(fixture.ledger().exists());
  assert!(fixture.run_dir("dotrun000003").is_some());
  assert!(fixture.run_dir("dotrun000004").is_none());
}

#[test]
fn piped_logs_carry_no_color_codes() {
  let fixture = test_support::fixture_project();
  let out = fixture
    .command("logrun000001")
    .env("RUST_LOG", "info")
    .args(["--tasks", "build"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.contains("experiment complete"), "{stderr}");
  assert!(!stderr.contains('\u{1b}'), "{stderr:?}");
}
