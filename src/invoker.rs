// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Run one tagged, cache-disabled build through the project's Gradle wrapper and capture its output
// role: process/invoker
// inputs: project directory, BuildRequest (run number, clean flag, tags, tasks, args)
// outputs: BuildOutcome with the exact argument vector and captured stdout
// side_effects: Spawns ./gradlew; streams its stdout to our stdout while capturing it
// invariants:
// - every build gets --no-build-cache and the experiment + run id scan tags
// - only the first build carries the clean task
// - a non-zero exit is always an ExperimentError::Process; no retries
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::error::ExperimentError;
use crate::model::{BuildOutcome, ExperimentConfig, EXPERIMENT_TAG};
use crate::util::display_command;

/// Everything that distinguishes one build of the experiment from the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
  pub run_num: u8,
  pub clean: bool,
  pub run_id: String,
  pub tasks: Vec<String>,
  pub extra_args: Vec<String>,
  pub enable_ge: bool,
  pub ge_server: Option<String>,
}

impl BuildRequest {
  pub fn for_run(cfg: &ExperimentConfig, run_id: &str, run_num: u8, clean: bool) -> Self {
    Self {
      run_num,
      clean,
      run_id: run_id.to_string(),
      tasks: cfg.task_list(),
      extra_args: cfg.extra_arg_list(),
      enable_ge: cfg.enable_ge,
      ge_server: cfg.ge_server.clone(),
    }
  }

  /// The full argument vector passed to the build tool.
  pub fn args(&self) -> Vec<String> {
    let mut args: Vec<String> = vec![
      "--no-build-cache".into(),
      format!("-Dscan.tag.{EXPERIMENT_TAG}"),
      format!("-Dscan.tag.{}", self.run_id),
      format!("-Dscan.value.runId={}", self.run_id),
      format!("-Dscan.value.runNum={}", self.run_num),
    ];
    if self.enable_ge {
      args.push("--scan".into());
    }
    if let Some(server) = &self.ge_server {
      args.push(format!("-Dgradle.enterprise.url={server}"));
    }
    if self.clean {
      args.push("clean".into());
    }
    args.extend(self.tasks.iter().cloned());
    args.extend(self.extra_args.iter().cloned());
    args
  }
}

/// Runs a single tagged build and hands back what it printed.
pub trait BuildTool {
  fn run_tagged_build(&self, project_dir: &Path, request: &BuildRequest) -> Result<BuildOutcome, ExperimentError>;
}

/// The project's own `gradlew` script.
#[derive(Debug, Default)]
pub struct GradleWrapper {
  /// Capture without echoing to stdout.
  pub quiet: bool,
}

impl GradleWrapper {
  fn script_name() -> &'static str {
    if cfg!(windows) {
      "gradlew.bat"
    } else {
      "gradlew"
    }
  }
}

impl BuildTool for GradleWrapper {
  fn run_tagged_build(&self, project_dir: &Path, request: &BuildRequest) -> Result<BuildOutcome, ExperimentError> {
    let program = project_dir.join(Self::script_name());
    let args = request.args();
    let command = display_command(&format!("./{}", Self::script_name()), &args);
    info!(run = request.run_num, dir = %project_dir.display(), "starting build");
    debug!(%command, "build command");

    let spawn_error = |e: std::io::Error| ExperimentError::Process {
      command: command.clone(),
      status: None,
      output: e.to_string(),
    };

    let mut child = Command::new(&program)
      .args(&args)
      .current_dir(project_dir)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::inherit())
      .spawn()
      .map_err(spawn_error)?;

    let mut output = String::new();
    if let Some(stdout) = child.stdout.take() {
      let mut lock = std::io::stdout().lock();
      let echo: Option<&mut dyn Write> = if self.quiet { None } else { Some(&mut lock) };
      let pumped = pump_lines(stdout, echo, &mut output);
      if let Err(e) = pumped {
        let _ = child.kill();
        let _ = child.wait();
        return Err(spawn_error(e));
      }
    }

    let status = child.wait().map_err(spawn_error)?;
    if !status.success() {
      return Err(ExperimentError::Process {
        command,
        status: status.code(),
        output: tail(&output, 20),
      });
    }

    info!(run = request.run_num, "build finished");
    Ok(BuildOutcome {
      run_num: request.run_num,
      args,
      output,
    })
  }
}

/// Copy `reader` into `output` line by line, echoing to `echo` when given.
///
/// Echo failures are logged once and echoing stops; capture continues.
fn pump_lines<R: Read>(reader: R, mut echo: Option<&mut dyn Write>, output: &mut String) -> std::io::Result<()> {
  let mut reader = BufReader::new(reader);
  let mut buf: Vec<u8> = Vec::new();
  loop {
    buf.clear();
    if reader.read_until(b'\n', &mut buf)? == 0 {
      return Ok(());
    }
    let line = String::from_utf8_lossy(&buf);
    let echoed = match echo.as_deref_mut() {
      Some(out) => out.write_all(line.as_bytes()),
      None => Ok(()),
    };
    if let Err(e) = echoed {
      warn!(error = %e, "cannot echo build output; capturing only");
      echo = None;
    }
    output.push_str(&line);
  }
}

/// Last `n` lines of a captured output, for error messages.
fn tail(output: &str, n: usize) -> String {
  let lines: Vec<&str> = output.lines().collect();
  let start = lines.len().saturating_sub(n);
  lines[start..].join("\n")
}
