// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Linear step machine, per-step narration, and the prompt seam for interactive (wizard) runs
// role: interaction/wizard
// inputs: Current Step, ExperimentConfig, a Prompter
// outputs: Narration text; config fields collected from the user
// invariants:
// - Step::next only moves forward; Done is terminal
// - narration is a pure function of (step, config)
// - an empty prompt answer keeps the current value
// errors: Esc / Ctrl-C in a prompt becomes ExperimentError::Cancelled
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::error::ExperimentError;
use crate::model::{non_empty, ExperimentConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  Intro,
  CollectGitDetails,
  CollectBuildDetails,
  Clone,
  FirstBuild,
  SecondBuild,
  Summary,
  Done,
}

impl Step {
  pub fn next(self) -> Step {
    match self {
      Step::Intro => Step::CollectGitDetails,
      Step::CollectGitDetails => Step::CollectBuildDetails,
      Step::CollectBuildDetails => Step::Clone,
      Step::Clone => Step::FirstBuild,
      Step::FirstBuild => Step::SecondBuild,
      Step::SecondBuild => Step::Summary,
      Step::Summary | Step::Done => Step::Done,
    }
  }
}

/// Explanatory text shown before a step in wizard mode.
pub fn narration(step: Step, cfg: &ExperimentConfig) -> Option<String> {
  let text = match step {
    Step::Intro => "\
Validate incremental building

This experiment runs the same Gradle build twice, without the build cache.
The first build starts from a clean state; the second runs right after it
without cleaning. In a well-tuned build the second build executes few or no
tasks: everything it needs is already up to date.

Both builds publish a build scan. At the end you get links that compare the
two scans so you can see which tasks ran again and why."
      .to_string(),
    Step::CollectGitDetails => "\
First, tell me where the project lives. I will clone it into a fresh
experiment directory so your own working copy is never touched."
      .to_string(),
    Step::CollectBuildDetails => "\
Next, tell me which Gradle tasks to run. Pick tasks that do real work, such
as 'assemble' or 'build'. Any extra arguments are passed to both builds."
      .to_string(),
    Step::Clone => format!(
      "I will now clone {} ({}) into the experiment directory.",
      cfg.git_repo,
      cfg.git_branch.as_deref().unwrap_or("default branch")
    ),
    Step::FirstBuild => format!(
      "Now the first build: 'clean {}' with the build cache disabled.\n\
       Its build scan is the baseline for the comparison.",
      cfg.tasks
    ),
    Step::SecondBuild => format!(
      "Now the second build: '{}' again, without 'clean'.\n\
       Tasks that run again here are candidates for incremental building fixes.",
      cfg.tasks
    ),
    Step::Summary => "\
Both builds are done. Below are the build scans and quick links for the
investigation. Start with the task inputs comparison: it lists the inputs
that changed between the two builds."
      .to_string(),
    Step::Done => return None,
  };
  Some(text)
}

/// Dependency injection seam for user interaction.
pub trait Prompter {
  /// Block until the user acknowledges `message`.
  fn pause(&self, message: &str) -> Result<(), ExperimentError>;

  /// Ask for a value; an empty answer means `default`.
  fn text(&self, message: &str, default: &str) -> Result<String, ExperimentError>;
}

fn handle_inquire_result<T>(result: Result<T, inquire::InquireError>) -> Result<T, ExperimentError> {
  match result {
    Ok(v) => Ok(v),
    Err(inquire::InquireError::OperationCanceled | inquire::InquireError::OperationInterrupted) => {
      Err(ExperimentError::Cancelled)
    }
    Err(e) => Err(ExperimentError::Process {
      command: "prompt".into(),
      status: None,
      output: e.to_string(),
    }),
  }
}

/// Terminal prompts via `inquire`.
#[derive(Debug, Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
  fn pause(&self, message: &str) -> Result<(), ExperimentError> {
    handle_inquire_result(inquire::Text::new(message).prompt()).map(|_| ())
  }

  fn text(&self, message: &str, default: &str) -> Result<String, ExperimentError> {
    let mut prompt = inquire::Text::new(message);
    if !default.is_empty() {
      prompt = prompt.with_default(default);
    }
    let answer = handle_inquire_result(prompt.prompt())?;
    Ok(if answer.trim().is_empty() {
      default.to_string()
    } else {
      answer.trim().to_string()
    })
  }
}

pub const CONTINUE_PROMPT: &str = "Press <Enter> to continue.";

/// Answer that clears an optional value instead of keeping its default.
pub const CLEAR_ANSWER: &str = "-";

fn optional_answer(answer: String) -> String {
  if answer.trim() == CLEAR_ANSWER {
    String::new()
  } else {
    answer
  }
}

pub fn collect_git_details(cfg: &mut ExperimentConfig, prompter: &dyn Prompter) -> Result<(), ExperimentError> {
  cfg.git_repo = prompter.text("Git repository to clone:", &cfg.git_repo)?;
  let branch = cfg.git_branch.clone().unwrap_or_default();
  let answer = prompter.text("Git branch ('-' for the repository default):", &branch)?;
  cfg.git_branch = non_empty(Some(optional_answer(answer)));
  cfg.project_dir = prompter.text("Directory of the Gradle build inside the repository:", &cfg.project_dir)?;
  cfg.rederive();
  Ok(())
}

pub fn collect_build_details(cfg: &mut ExperimentConfig, prompter: &dyn Prompter) -> Result<(), ExperimentError> {
  cfg.tasks = prompter.text("Gradle tasks to run:", &cfg.tasks)?;
  let answer = prompter.text("Additional Gradle arguments ('-' for none):", &cfg.extra_args)?;
  cfg.extra_args = optional_answer(answer);
  if cfg.enable_ge {
    let server = cfg.ge_server.clone().unwrap_or_default();
    cfg.ge_server = non_empty(Some(prompter.text("Gradle Enterprise server URL:", &server)?));
  }
  cfg.rederive();
  Ok(())
}
