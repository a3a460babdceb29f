use predicates::prelude::*;

#[test]
fn missing_git_repo_fails_fast() {
  let td = test_support::tempdir();
  let data_dir = td.path().join("data");
  let mut cmd = test_support::cmd_bin(test_support::BIN);
  cmd
    .args(["--tasks", "build", "--data-dir", data_dir.to_str().unwrap()])
    .assert()
    .failure()
    .code(2)
    .stderr(predicate::str::contains("--git-repo"));
  assert!(!data_dir.exists(), "nothing may be created before validation passes");
}

#[test]
fn missing_tasks_fails_fast() {
  let td = test_support::tempdir();
  let data_dir = td.path().join("data");
  let mut cmd = test_support::cmd_bin(test_support::BIN);
  cmd
    .args([
      "--git-repo",
      "https://example.invalid/acme/widgets.git",
      "--data-dir",
      data_dir.to_str().unwrap(),
    ])
    .assert()
    .failure()
    .code(2)
    .stderr(predicate::str::contains("--tasks"));
  assert!(!data_dir.exists());
}

#[test]
fn enable_ge_without_server_is_rejected() {
  let mut cmd = test_support::cmd_bin(test_support::BIN);
  cmd
    .args([
      "--git-repo",
      "https://example.invalid/acme/widgets.git",
      "--tasks",
      "build",
      "--enable-ge",
    ])
    .assert()
    .failure()
    .code(2)
    .stderr(predicate::str::contains("--ge-server"));
}

#[test]
fn run_id_must_be_a_plain_token() {
  let td = test_support::tempdir();
  let data_dir = td.path().join("data");
  let mut cmd = test_support::cmd_bin(test_support::BIN);
  cmd
    .args([
      "--git-repo",
      "https://example.invalid/acme/widgets.git",
      "--tasks",
      "build",
      "--data-dir",
      data_dir.to_str().unwrap(),
      "--run-id",
      "../../outside",
    ])
    .assert()
    .failure()
    .code(2)
    .stderr(predicate::str::contains("--run-id"));
  assert!(!data_dir.exists());
}

#[test]
fn unknown_flag_is_a_usage_error() {
  let mut cmd = test_support::cmd_bin(test_support::BIN);
  cmd.arg("--no-such-flag").assert().failure().code(2);
}

#[cfg(unix)]
#[test]
fn config_can_come_from_environment() {
  let fixture = test_support::fixture_project();
  let data_dir = fixture.data_dir();
  let mut cmd = test_support::cmd_bin(test_support::BIN);
  cmd
    .env("FAKE_GRADLE_LOG", fixture.gradle_log())
    .env("EXP_GIT_REPO", fixture.repo_arg())
    .env("EXP_TASKS", "assemble")
    .env("EXP_DATA_DIR", &data_dir)
    .args(["--run-id", "envrun000001"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Gradle tasks:             assemble"));

  let calls = fixture.gradle_invocations();
  assert_eq!(calls.len(), 2);
  assert!(calls.iter().all(|c| c.ends_with("assemble")));
}
