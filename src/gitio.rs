use std::path::{Component, Path};

use tracing::{info, warn};

use crate::error::ExperimentError;
use crate::util::run_git;

/// Brings the project under test into the experiment directory.
pub trait ProjectFetcher {
  /// Clone `repo` (optionally at `branch`) into `dest`; returns the checked-out commit id.
  fn fetch(&self, repo: &str, branch: Option<&str>, dest: &Path) -> Result<String, ExperimentError>;
}

/// Fetches with the `git` executable found on PATH.
#[derive(Debug, Default)]
pub struct GitFetcher;

impl ProjectFetcher for GitFetcher {
  fn fetch(&self, repo: &str, branch: Option<&str>, dest: &Path) -> Result<String, ExperimentError> {
    check_checkout_dest(dest)?;
    if dest.exists() {
      warn!(dest = %dest.display(), "checkout directory exists; replacing it");
      std::fs::remove_dir_all(dest).map_err(|e| ExperimentError::Process {
        command: format!("remove {}", dest.display()),
        status: None,
        output: e.to_string(),
      })?;
    }

    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    info!(%repo, branch = branch.unwrap_or("<default>"), "cloning project");
    run_git(parent, &clone_args(repo, branch, dest))?;

    head_commit(dest)
  }
}

/// The checkout must be a plain, named directory; anything else could make the
/// replace step remove a directory other than the one the clone will fill.
fn check_checkout_dest(dest: &Path) -> Result<(), ExperimentError> {
  let text = dest.to_string_lossy();
  let last = text.rsplit(['/', '\\']).next().unwrap_or("");
  let plain = !matches!(last, "" | "." | "..")
    && dest.components().all(|c| !matches!(c, Component::ParentDir | Component::CurDir));
  match dest.components().next_back() {
    Some(Component::Normal(_)) if plain => Ok(()),
    _ => Err(ExperimentError::Config {
      field: "--git-repo",
      reason: format!("refusing to use '{}' as a checkout directory", dest.display()),
    }),
  }
}

pub fn clone_args(repo: &str, branch: Option<&str>, dest: &Path) -> Vec<String> {
  let mut args: Vec<String> = vec!["clone".into(), "--depth=1".into(), "--quiet".into()];
  if let Some(b) = branch {
    args.push("--branch".into());
    args.push(b.into());
  }
  args.push(repo.into());
  args.push(dest.to_string_lossy().to_string());
  args
}

pub fn head_commit(dir: &Path) -> Result<String, ExperimentError> {
  let out = run_git(dir, &["rev-parse".into(), "HEAD".into()])?;
  Ok(out.trim().to_string())
}
