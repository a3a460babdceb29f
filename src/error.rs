// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed failure kinds of an experiment run and their process exit codes
// role: errors
// outputs: ExperimentError variants; exit_code mapping used by main
// invariants:
// - Config errors are raised before any clone or build side effect
// - Process errors carry the external tool's output verbatim
// - Parse errors never roll back builds that already completed
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExperimentError {
  /// A required configuration field is missing or invalid.
  #[error("invalid configuration: {field}: {reason}")]
  Config { field: &'static str, reason: String },

  /// An external process (git, gradlew) could not be launched or exited non-zero.
  #[error("{command} failed{}: {output}", status_suffix(.status))]
  Process {
    command: String,
    status: Option<i32>,
    output: String,
  },

  /// The build output did not match the expected build scan grammar.
  #[error("could not extract build scan from {source_name}: {reason}")]
  Parse { source_name: String, reason: String },

  /// The user backed out of a wizard prompt.
  #[error("cancelled by user")]
  Cancelled,
}

fn status_suffix(status: &Option<i32>) -> String {
  match status {
    Some(code) => format!(" with exit code {code}"),
    None => String::new(),
  }
}

impl ExperimentError {
  pub fn missing(field: &'static str) -> Self {
    ExperimentError::Config {
      field,
      reason: "required value is empty".into(),
    }
  }

  pub fn parse(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
    ExperimentError::Parse {
      source_name: source_name.into(),
      reason: reason.into(),
    }
  }

  pub fn exit_code(&self) -> u8 {
    match self {
      ExperimentError::Config { .. } => 2,
      ExperimentError::Process { .. } => 3,
      ExperimentError::Parse { .. } => 4,
      ExperimentError::Cancelled => 130,
    }
  }
}

/// Exit code for an arbitrary error chain; unknown failures map to 1.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
  err
    .chain()
    .find_map(|cause| cause.downcast_ref::<ExperimentError>())
    .map(ExperimentError::exit_code)
    .unwrap_or(1)
}
