// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Render the experiment summary and the investigation quick links as plain text
// role: rendering/report
// inputs: ExperimentConfig, ExperimentContext, commit id, optional pair of ScanResults
// outputs: Summary text block; QuickLinks built from scan ids by URL template substitution
// invariants:
// - pure functions; identical inputs render identical text
// - quick links use the second build's base URL with any trailing slash removed
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::Write;

use serde::Serialize;

use crate::model::{ExperimentConfig, ExperimentContext, ScanResult, EXPERIMENT_NAME, EXPERIMENT_TAG};

const LABEL_WIDTH: usize = 26;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickLinks {
  pub execution_overview: String,
  pub timeline: String,
  pub task_inputs_comparison: String,
}

impl QuickLinks {
  #[cfg(test)]
  pub fn as_list(&self) -> [&str; 3] {
    [&self.execution_overview, &self.timeline, &self.task_inputs_comparison]
  }
}

pub fn quick_links_for(base_url: &str, first_id: &str, second_id: &str) -> QuickLinks {
  let base = base_url.trim_end_matches('/');
  QuickLinks {
    execution_overview: format!("{base}/s/{second_id}/performance/execution"),
    timeline: format!("{base}/s/{second_id}/timeline?outcome=SUCCESS,FAILED&sort=longest"),
    task_inputs_comparison: format!("{base}/c/{first_id}/{second_id}/task-inputs"),
  }
}

pub fn quick_links(first: &ScanResult, second: &ScanResult) -> QuickLinks {
  quick_links_for(&second.base_url, &first.scan_id, &second.scan_id)
}

fn line(out: &mut String, label: &str, value: &str) {
  let label = format!("{label}:");
  let _ = writeln!(out, "{label:<LABEL_WIDTH$}{value}");
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
  if value.trim().is_empty() {
    placeholder
  } else {
    value
  }
}

/// Summary block followed by the quick links (when both scans are known).
pub fn render_summary(
  cfg: &ExperimentConfig,
  ctx: &ExperimentContext,
  commit_id: Option<&str>,
  scans: Option<(&ScanResult, &ScanResult)>,
) -> String {
  let mut out = String::new();
  out.push_str("Summary\n-------\n");
  line(&mut out, "Project", &cfg.project_name);
  line(&mut out, "Git repo", &cfg.git_repo);
  line(&mut out, "Git branch", cfg.git_branch.as_deref().unwrap_or("<default>"));
  line(&mut out, "Git commit id", commit_id.unwrap_or("<unknown>"));
  line(&mut out, "Project dir", &cfg.project_dir);
  line(&mut out, "Gradle tasks", &cfg.tasks);
  line(&mut out, "Gradle arguments", or_placeholder(&cfg.extra_args, "<none>"));
  line(&mut out, "Experiment", EXPERIMENT_NAME);
  line(&mut out, "Experiment id", EXPERIMENT_TAG);
  line(&mut out, "Experiment run id", &ctx.run_id);
  line(&mut out, "Experiment artifact dir", &ctx.experiment_dir.to_string_lossy());

  match scans {
    Some((first, second)) => {
      line(&mut out, "Build scan first build", &first.scan_url);
      line(&mut out, "Build scan second build", &second.scan_url);

      let links = quick_links(first, second);
      out.push_str("\nInvestigation Quick Links\n-------------------------\n");
      line(&mut out, "Task execution overview", &links.execution_overview);
      line(&mut out, "Executed tasks timeline", &links.timeline);
      line(&mut out, "Task inputs comparison", &links.task_inputs_comparison);
    }
    None => {
      line(&mut out, "Build scan first build", "<unavailable>");
      line(&mut out, "Build scan second build", "<unavailable>");
    }
  }
  out
}
