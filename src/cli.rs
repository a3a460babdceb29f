use std::path::PathBuf;

use clap::Parser;

use crate::error::ExperimentError;
use crate::model::{check_run_id, non_empty, project_name_from_repo, ExperimentConfig};

#[derive(Parser, Debug)]
#[command(
    name = "gradle-incremental-experiment",
    version,
    about = "Run a clean build and an incremental rebuild of a Gradle project and link their build scans",
    long_about = None
)]
pub struct Cli {
  /// Git repository to clone (URL or local path)
  #[arg(long, env = "EXP_GIT_REPO")]
  pub git_repo: Option<String>,

  /// Branch to check out (default: the repository's default branch)
  #[arg(long, env = "EXP_GIT_BRANCH")]
  pub git_branch: Option<String>,

  /// Directory of the Gradle build inside the repository
  #[arg(long, env = "EXP_PROJECT_DIR", default_value = ".")]
  pub project_dir: String,

  /// Gradle tasks to run, space separated, e.g. "assemble"
  #[arg(long, env = "EXP_TASKS")]
  pub tasks: Option<String>,

  /// Additional arguments passed to both builds, space separated
  #[arg(long = "args", env = "EXP_ARGS", allow_hyphen_values = true)]
  pub extra_args: Option<String>,

  /// Publish build scans to a Gradle Enterprise server (requires --ge-server)
  #[arg(long)]
  pub enable_ge: bool,

  /// Gradle Enterprise server URL, e.g. https://ge.example.com
  #[arg(long, env = "EXP_GE_SERVER")]
  pub ge_server: Option<String>,

  /// Walk through the experiment step by step with explanations
  #[arg(short = 'i', long)]
  pub interactive: bool,

  /// Directory that holds experiment runs and the build scan ledger
  #[arg(long, env = "EXP_DATA_DIR", default_value = ".data")]
  pub data_dir: PathBuf,

  /// Log debug details to stderr
  #[arg(short, long)]
  pub verbose: bool,

  /// Use a fixed run id instead of a random one (hidden; tests only)
  #[arg(long, hide = true)]
  pub run_id: Option<String>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

/// Settings that shape the run but are not part of the experiment itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
  pub data_dir: PathBuf,
  pub run_id: Option<String>,
  pub verbose: bool,
}

/// Turn parsed flags into the experiment config. Config validation happens
/// later, after the wizard (if any) had a chance to fill in missing values;
/// only the run id is checked here.
pub fn normalize(cli: Cli) -> Result<(ExperimentConfig, RunOptions), ExperimentError> {
  let git_repo = cli.git_repo.map(|s| s.trim().to_string()).unwrap_or_default();
  let mut cfg = ExperimentConfig {
    project_name: project_name_from_repo(&git_repo),
    git_repo,
    git_branch: non_empty(cli.git_branch),
    project_dir: cli.project_dir,
    tasks: cli.tasks.map(|s| s.trim().to_string()).unwrap_or_default(),
    extra_args: cli.extra_args.map(|s| s.trim().to_string()).unwrap_or_default(),
    enable_ge: cli.enable_ge,
    ge_server: non_empty(cli.ge_server),
    interactive_mode: cli.interactive,
  };
  cfg.rederive();

  let run_id = non_empty(cli.run_id);
  if let Some(id) = &run_id {
    check_run_id(id)?;
  }
  let opts = RunOptions {
    data_dir: cli.data_dir,
    run_id,
    verbose: cli.verbose,
  };
  Ok((cfg, opts))
}
