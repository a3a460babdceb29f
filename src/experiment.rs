// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Drive one experiment run through the Step machine: collect, clone, build twice, extract, persist, report
// role: processing/orchestrator
// inputs: ExperimentConfig, ExperimentContext, ProjectFetcher, BuildTool, optional Prompter, output sink
// outputs: ExperimentOutcome; summary text written to the sink; artifacts on disk
// side_effects: Creates the experiment dir; clones; runs builds; writes logs, experiment.json, build-scans.csv
// invariants:
// - validation passes before the experiment dir is created or anything is cloned
// - builds run in order: clean + no cache, then no clean + no cache
// - a failed first build means the second build never starts
// - interactive and non-interactive runs produce the same summary for the same config
// errors: Config before side effects; Process aborts immediately; Parse after both builds, logs are kept
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::gitio::ProjectFetcher;
use crate::invoker::{BuildRequest, BuildTool};
use crate::manifest::{append_scan_rows, write_build_log, ExperimentManifest};
use crate::model::{BuildOutcome, ExperimentConfig, ExperimentContext, ScanResult};
use crate::report::render_summary;
use crate::scans::extract_pair;
use crate::util::prepare_experiment_dir;
use crate::wizard::{collect_build_details, collect_git_details, narration, Prompter, Step, CONTINUE_PROMPT};

/// What a completed run produced.
#[derive(Debug)]
pub struct ExperimentOutcome {
  pub config: ExperimentConfig,
  pub commit_id: String,
  pub scans: (ScanResult, ScanResult),
  pub summary: String,
}

pub struct Workflow<'a> {
  pub cfg: ExperimentConfig,
  pub ctx: ExperimentContext,
  pub fetcher: &'a dyn ProjectFetcher,
  pub builder: &'a dyn BuildTool,
  /// Present only in wizard mode.
  pub prompter: Option<&'a dyn Prompter>,
  pub out: &'a mut dyn Write,
}

#[derive(Default)]
struct RunState {
  commit_id: Option<String>,
  checkout: Option<PathBuf>,
  builds: Vec<BuildOutcome>,
  scans: Option<(ScanResult, ScanResult)>,
  summary: Option<String>,
}

impl<'a> Workflow<'a> {
  pub fn run(mut self) -> Result<ExperimentOutcome> {
    if self.prompter.is_none() {
      self.cfg.validate()?;
    }

    let mut state = RunState::default();
    let mut step = Step::Intro;
    while step != Step::Done {
      if let Some(prompter) = self.prompter {
        if let Some(text) = narration(step, &self.cfg) {
          writeln!(self.out, "\n{text}\n")?;
          prompter.pause(CONTINUE_PROMPT)?;
        }
      }
      self.perform(step, &mut state)?;
      step = step.next();
    }

    let scans = state.scans.context("experiment finished without build scans")?;
    Ok(ExperimentOutcome {
      config: self.cfg,
      commit_id: state.commit_id.unwrap_or_default(),
      scans,
      summary: state.summary.unwrap_or_default(),
    })
  }

  fn perform(&mut self, step: Step, state: &mut RunState) -> Result<()> {
    match step {
      Step::Intro | Step::Done => {}
      Step::CollectGitDetails => {
        if let Some(prompter) = self.prompter {
          collect_git_details(&mut self.cfg, prompter)?;
        }
      }
      Step::CollectBuildDetails => {
        if let Some(prompter) = self.prompter {
          collect_build_details(&mut self.cfg, prompter)?;
          self.cfg.validate()?;
        }
      }
      Step::Clone => {
        let dir = prepare_experiment_dir(&self.ctx.experiment_dir)?;
        self.ctx.experiment_dir = dir;
        let dest = self.ctx.checkout_dir(&self.cfg);
        let commit_id = self
          .fetcher
          .fetch(&self.cfg.git_repo, self.cfg.git_branch.as_deref(), &dest)?;
        info!(%commit_id, dest = %dest.display(), "project checked out");
        state.checkout = Some(dest.join(&self.cfg.project_dir));
        state.commit_id = Some(commit_id);
      }
      Step::FirstBuild => self.build(state, 1, true)?,
      Step::SecondBuild => self.build(state, 2, false)?,
      Step::Summary => self.summarize(state)?,
    }
    Ok(())
  }

  fn build(&mut self, state: &mut RunState, run_num: u8, clean: bool) -> Result<()> {
    let project_dir = state.checkout.clone().context("build requested before clone")?;
    let request = BuildRequest::for_run(&self.cfg, &self.ctx.run_id, run_num, clean);
    let outcome = self.builder.run_tagged_build(&project_dir, &request)?;
    write_build_log(&self.ctx.experiment_dir, run_num, &outcome.output)?;
    state.builds.push(outcome);
    Ok(())
  }

  fn summarize(&mut self, state: &mut RunState) -> Result<()> {
    let commit_id = state.commit_id.as_deref();
    let (first, second) = match state.builds.as_slice() {
      [first, second] => (first, second),
      other => anyhow::bail!("expected two builds, found {}", other.len()),
    };

    let scans = match extract_pair(&first.output, &second.output) {
      Ok(pair) => pair,
      Err(err) => {
        warn!(%err, "build scans could not be extracted; build logs are kept");
        let summary = render_summary(&self.cfg, &self.ctx, commit_id, None);
        writeln!(self.out, "{summary}")?;
        ExperimentManifest::new(&self.cfg, &self.ctx, commit_id).write_to(&self.ctx.experiment_dir)?;
        return Err(err.into());
      }
    };

    ExperimentManifest::new(&self.cfg, &self.ctx, commit_id)
      .with_scans(&scans.0, &scans.1)
      .write_to(&self.ctx.experiment_dir)?;
    append_scan_rows(
      &self.ctx.scan_ledger_path(),
      &self.cfg,
      &self.ctx,
      &[(first.run_num, &scans.0), (second.run_num, &scans.1)],
    )?;

    let summary = render_summary(&self.cfg, &self.ctx, commit_id, Some((&scans.0, &scans.1)));
    writeln!(self.out, "{summary}")?;
    state.summary = Some(summary);
    state.scans = Some(scans);
    Ok(())
  }
}
