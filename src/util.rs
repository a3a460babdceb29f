// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for paths, subprocesses, run ids, experiment directories, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; paths; clap CommandFactory
// outputs: Canonicalized paths, git stdout, run ids, directories ensured, man page text
// side_effects: prepare_experiment_dir creates directories; run_git invokes subprocesses
// invariants:
// - prepare_experiment_dir returns an existing, empty-on-creation directory
// - new_run_id is 12 lowercase hex characters
// errors: run_git surfaces command + stderr as ExperimentError::Process; IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::CommandFactory;
use tracing::debug;

use crate::error::ExperimentError;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> PathBuf {
  let p = p.as_ref();
  match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  }
}

/// Render a command line for messages and logs.
pub fn display_command(program: &str, args: &[String]) -> String {
  std::iter::once(program.to_string())
    .chain(args.iter().cloned())
    .collect::<Vec<_>>()
    .join(" ")
}

pub fn run_git(dir: &Path, args: &[String]) -> Result<String, ExperimentError> {
  let command = display_command("git", args);
  debug!(%command, dir = %dir.display(), "running git");

  let out = Command::new("git")
    .args(args)
    .current_dir(dir)
    .output()
    .map_err(|e| ExperimentError::Process {
      command: command.clone(),
      status: None,
      output: e.to_string(),
    })?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    Err(ExperimentError::Process {
      command,
      status: out.status.code(),
      output: String::from_utf8_lossy(&out.stderr).trim_end().to_string(),
    })
  }
}

/// Shortens an id to its first 12 characters.
pub fn short_id(full: &str) -> String {
  full.chars().take(12).collect()
}

pub fn new_run_id() -> String {
  short_id(&uuid::Uuid::new_v4().simple().to_string())
}

/// Create the run's experiment directory (and its parents).
///
/// A leftover directory from an earlier run with the same id is cleared first.
pub fn prepare_experiment_dir(dir: &Path) -> Result<PathBuf> {
  if dir.exists() {
    std::fs::remove_dir_all(dir).with_context(|| format!("clearing {}", dir.display()))?;
  }
  std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
  Ok(canonicalize_lossy(dir))
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
