// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Persist run artifacts: build logs, the per-run experiment.json, and the shared build-scans.csv ledger
// role: persistence/manifest
// inputs: ExperimentConfig, ExperimentContext, commit id, BuildOutcomes, ScanResults
// outputs: build-<n>.log and experiment.json under the experiment dir; rows appended to build-scans.csv
// side_effects: Writes to filesystem
// invariants:
// - the ledger header is written exactly once, when the file is created
// - ledger rows are only ever appended, one per build scan
// - generated_at is serialized in %Y-%m-%dT%H:%M:%S (local)
// errors: IO errors surfaced with full path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{ExperimentConfig, ExperimentContext, ScanResult};
use crate::report::quick_links;

pub const LEDGER_HEADER: &str = "timestamp,run_id,run_num,project_name,git_branch,tasks,base_url,scan_id,scan_url";

/// Save one build's captured output as `build-<run_num>.log`.
pub fn write_build_log(experiment_dir: &Path, run_num: u8, output: &str) -> Result<PathBuf> {
  let path = experiment_dir.join(format!("build-{run_num}.log"));
  std::fs::write(&path, output).with_context(|| format!("writing {}", path.display()))?;
  Ok(path)
}

/// Helper to build and write the per-run experiment.json.
pub struct ExperimentManifest {
  value: serde_json::Value,
}

impl ExperimentManifest {
  pub fn new(cfg: &ExperimentConfig, ctx: &ExperimentContext, commit_id: Option<&str>) -> Self {
    let value = serde_json::json!({
      "run_id": ctx.run_id,
      "generated_at": ctx.started_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
      "experiment_dir": ctx.experiment_dir.to_string_lossy(),
      "commit_id": commit_id,
      "config": cfg,
      "scans": [],
    });
    Self { value }
  }

  pub fn with_scans(mut self, first: &ScanResult, second: &ScanResult) -> Self {
    self.value["scans"] = serde_json::json!([first, second]);
    self.value["quick_links"] = serde_json::json!(quick_links(first, second));
    self
  }

  pub fn write_to(&self, experiment_dir: &Path) -> Result<PathBuf> {
    let path = experiment_dir.join("experiment.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&self.value)?).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
  }

  #[cfg(test)]
  pub fn as_value(&self) -> &serde_json::Value {
    &self.value
  }
}

/// Quote a CSV field when it contains a delimiter, quote, or line break.
fn csv_field(s: &str) -> Cow<'_, str> {
  if s.contains([',', '"', '\n', '\r']) {
    Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
  } else {
    Cow::Borrowed(s)
  }
}

fn ledger_row(cfg: &ExperimentConfig, ctx: &ExperimentContext, run_num: u8, scan: &ScanResult) -> String {
  let timestamp = ctx.started_at.format("%Y-%m-%dT%H:%M:%S").to_string();
  let run_num = run_num.to_string();
  let fields = [
    timestamp.as_str(),
    ctx.run_id.as_str(),
    run_num.as_str(),
    cfg.project_name.as_str(),
    cfg.git_branch.as_deref().unwrap_or(""),
    cfg.tasks.as_str(),
    scan.base_url.as_str(),
    scan.scan_id.as_str(),
    scan.scan_url.as_str(),
  ];
  fields.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",")
}

/// Append one row per scan to the shared ledger, creating it (with header) on first use.
pub fn append_scan_rows(
  ledger: &Path,
  cfg: &ExperimentConfig,
  ctx: &ExperimentContext,
  scans: &[(u8, &ScanResult)],
) -> Result<()> {
  if let Some(parent) = ledger.parent() {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  let is_new = std::fs::metadata(ledger).map(|m| m.len() == 0).unwrap_or(true);
  let mut file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(ledger)
    .with_context(|| format!("opening {}", ledger.display()))?;

  let mut buf = String::new();
  if is_new {
    buf.push_str(LEDGER_HEADER);
    buf.push('\n');
  }
  for (run_num, scan) in scans {
    buf.push_str(&ledger_row(cfg, ctx, *run_num, scan));
    buf.push('\n');
  }
  file
    .write_all(buf.as_bytes())
    .with_context(|| format!("appending to {}", ledger.display()))?;
  Ok(())
}
