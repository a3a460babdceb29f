// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the experiment configuration, per-run context, and per-build results shared by all phases
// role: model/types
// outputs: Serializable structs written to experiment.json and rendered by the reporter
// invariants:
// - ExperimentConfig::validate passes before any clone or build is attempted
// - project_name is derived from git_repo and never empty after validation
// - ScanResult.scan_id is non-empty and alphanumeric
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::ExperimentError;
use crate::util::canonicalize_lossy;

/// Directory name of this experiment under the data dir.
pub const EXPERIMENT_NAME: &str = "01-validate-incremental-building";

/// Scan tag shared by every build of this experiment.
pub const EXPERIMENT_TAG: &str = "exp1-gradle";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
  pub git_repo: String,
  pub project_name: String,
  pub git_branch: Option<String>,
  pub project_dir: String,
  pub tasks: String,
  pub extra_args: String,
  pub enable_ge: bool,
  pub ge_server: Option<String>,
  pub interactive_mode: bool,
}

impl ExperimentConfig {
  /// Check required fields; the first failure names its flag.
  pub fn validate(&self) -> Result<(), ExperimentError> {
    if self.git_repo.trim().is_empty() {
      return Err(ExperimentError::missing("--git-repo"));
    }
    if self.project_name.trim().is_empty() {
      return Err(ExperimentError::Config {
        field: "--git-repo",
        reason: format!("cannot derive a project name from '{}'", self.git_repo),
      });
    }
    let single_segment = matches!(
      Path::new(&self.project_name).components().collect::<Vec<_>>().as_slice(),
      [Component::Normal(_)]
    );
    if !single_segment || self.project_name.contains(['/', '\\']) {
      return Err(ExperimentError::Config {
        field: "--git-repo",
        reason: format!("'{}' is not usable as a checkout directory name", self.project_name),
      });
    }
    if self.tasks.trim().is_empty() {
      return Err(ExperimentError::missing("--tasks"));
    }

    let dir = Path::new(&self.project_dir);
    let escapes = dir
      .components()
      .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes {
      return Err(ExperimentError::Config {
        field: "--project-dir",
        reason: format!("'{}' must be a relative path inside the project", self.project_dir),
      });
    }

    match self.ge_server.as_deref() {
      Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
        return Err(ExperimentError::Config {
          field: "--ge-server",
          reason: format!("'{url}' is not an http(s) URL"),
        });
      }
      None if self.enable_ge => return Err(ExperimentError::missing("--ge-server")),
      _ => {}
    }
    Ok(())
  }

  pub fn task_list(&self) -> Vec<String> {
    split_words(&self.tasks)
  }

  pub fn extra_arg_list(&self) -> Vec<String> {
    split_words(&self.extra_args)
  }

  /// Refresh fields that are derived from others (after the wizard edits them).
  pub fn rederive(&mut self) {
    self.git_repo = resolve_local_repo(&self.git_repo);
    self.project_name = project_name_from_repo(&self.git_repo);
    self.git_branch = non_empty(self.git_branch.take());
    self.ge_server = non_empty(self.ge_server.take());
    if self.project_dir.trim().is_empty() {
      self.project_dir = ".".into();
    }
  }
}

fn split_words(s: &str) -> Vec<String> {
  s.split_whitespace().map(str::to_string).collect()
}

pub fn non_empty(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Existing local repositories become absolute, so the clone does not depend
/// on the directory it runs from. URLs and unknown paths pass through trimmed.
pub fn resolve_local_repo(repo: &str) -> String {
  let repo = repo.trim();
  if repo.is_empty() || !Path::new(repo).exists() {
    return repo.to_string();
  }
  canonicalize_lossy(repo).to_string_lossy().to_string()
}

/// Run ids end up in directory names and scan tags.
pub fn check_run_id(run_id: &str) -> Result<(), ExperimentError> {
  let ok = !run_id.is_empty() && run_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
  if ok {
    Ok(())
  } else {
    Err(ExperimentError::Config {
      field: "--run-id",
      reason: format!("'{run_id}' may only contain letters, digits, '_' and '-'"),
    })
  }
}

/// Last path segment of a clone URL, without `.git`.
///
/// Handles `https://host/org/name.git`, `git@host:org/name.git` and local paths.
pub fn project_name_from_repo(repo: &str) -> String {
  let trimmed = repo.trim().trim_end_matches('/');
  let last = trimmed.rsplit(['/', ':']).next().unwrap_or("");
  last.strip_suffix(".git").unwrap_or(last).to_string()
}

/// Identity and location of one experiment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentContext {
  pub run_id: String,
  pub started_at: DateTime<Local>,
  pub data_dir: PathBuf,
  pub experiment_dir: PathBuf,
}

impl ExperimentContext {
  pub fn new(run_id: String, started_at: DateTime<Local>, data_dir: PathBuf) -> Self {
    let experiment_dir = data_dir
      .join(EXPERIMENT_NAME)
      .join(format!("{}-{}", started_at.format("%Y%m%dT%H%M%S"), run_id));
    Self {
      run_id,
      started_at,
      data_dir,
      experiment_dir,
    }
  }

  /// Where the project is cloned for this run.
  pub fn checkout_dir(&self, cfg: &ExperimentConfig) -> PathBuf {
    self.experiment_dir.join(&cfg.project_name)
  }

  /// Shared across runs; one row per build is appended.
  pub fn scan_ledger_path(&self) -> PathBuf {
    self.data_dir.join(EXPERIMENT_NAME).join("build-scans.csv")
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
  pub scan_id: String,
  pub base_url: String,
  pub scan_url: String,
}

/// Captured result of one successful build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
  pub run_num: u8,
  pub args: Vec<String>,
  pub output: String,
}

#[cfg(test)]
pub(crate) fn sample_config() -> ExperimentConfig {
  ExperimentConfig {
    git_repo: "https://github.com/acme/widgets.git".into(),
    project_name: "widgets".into(),
    git_branch: Some("main".into()),
    project_dir: ".".into(),
    tasks: "build".into(),
    extra_args: String::new(),
    enable_ge: false,
    ge_server: None,
    interactive_mode: false,
  }
}
