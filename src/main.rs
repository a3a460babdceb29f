use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod error;
mod experiment;
mod gitio;
mod invoker;
mod manifest;
mod model;
mod report;
mod scans;
mod util;
mod wizard;

use crate::cli::{normalize, Cli};
use crate::experiment::Workflow;
use crate::gitio::GitFetcher;
use crate::invoker::GradleWrapper;
use crate::model::ExperimentContext;
use crate::wizard::{InquirePrompter, Prompter};

fn init_logging(verbose: bool) {
  let fallback = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_ansi(std::io::stderr().is_terminal())
    .with_target(false)
    .try_init();
}

fn run(cli: Cli) -> Result<()> {
  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI
  let (cfg, opts) = normalize(cli)?;
  init_logging(opts.verbose);

  // Phase 2: identify this run
  let run_id = opts.run_id.clone().unwrap_or_else(util::new_run_id);
  let now = chrono::Local::now();
  let ctx = ExperimentContext::new(run_id, now, util::canonicalize_lossy(&opts.data_dir));
  tracing::info!(run_id = %ctx.run_id, dir = %ctx.experiment_dir.display(), "starting experiment");

  // Phase 3: drive the experiment, narrated when interactive
  let inquire_prompter = InquirePrompter;
  let prompter: Option<&dyn Prompter> = if cfg.interactive_mode { Some(&inquire_prompter) } else { None };
  let mut stdout = std::io::stdout();
  let outcome = Workflow {
    cfg,
    ctx,
    fetcher: &GitFetcher,
    builder: &GradleWrapper::default(),
    prompter,
    out: &mut stdout,
  }
  .run()?;
  tracing::info!(
    project = %outcome.config.project_name,
    commit = %outcome.commit_id,
    first = %outcome.scans.0.scan_id,
    second = %outcome.scans.1.scan_id,
    summary_lines = outcome.summary.lines().count(),
    "experiment complete"
  );
  Ok(())
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::from(error::exit_code_for(&err))
    }
  }
}
