use assert_cmd::Command;

#[test]
fn gen_man_outputs_troff() {
  let mut cmd = Command::cargo_bin(test_support::BIN).unwrap();
  let out = cmd.args(["--gen-man"]).output().unwrap();
  assert!(out.status.success());
  let text = String::from_utf8_lossy(&out.stdout);
  assert!(text.contains(".TH "), "expected troff man header");
  assert!(text.contains("git\\-repo"), "flags should be documented");
}
