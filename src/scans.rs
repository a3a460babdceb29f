// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Extract build scan identity from captured build output under a strict line grammar
// role: parsing/extraction
// inputs: Captured build stdout plus a label used in error messages
// outputs: ScanResult {scan_id, base_url, scan_url}
// invariants:
// - exactly one "Publishing build scan..." marker; the next non-blank line is the scan URL
// - scan URL shape is <base>/s/<alphanumeric id>
// - the two builds of one experiment yield distinct ids
// errors: Any mismatch is ExperimentError::Parse; never an empty ScanResult
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ExperimentError;
use crate::model::ScanResult;

pub const PUBLISH_MARKER: &str = "Publishing build scan...";

static SCAN_URL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^(https?://[^\s/]+(?:/[^\s]*?)?)/s/([A-Za-z0-9]+)$").expect("scan url regex"));

/// Parse a scan URL line, e.g. `https://ge.example.com/s/abc123`.
pub fn parse_scan_url(line: &str) -> Option<ScanResult> {
  let caps = SCAN_URL.captures(line.trim())?;
  let base_url = caps.get(1)?.as_str().to_string();
  let scan_id = caps.get(2)?.as_str().to_string();
  Some(ScanResult {
    scan_url: format!("{base_url}/s/{scan_id}"),
    base_url,
    scan_id,
  })
}

/// Extract the single build scan published in `output`.
pub fn extract_scan(source_name: &str, output: &str) -> Result<ScanResult, ExperimentError> {
  let lines: Vec<&str> = output.lines().map(|l| l.trim_end_matches('\r')).collect();
  let markers: Vec<usize> = lines
    .iter()
    .enumerate()
    .filter(|(_, l)| l.trim() == PUBLISH_MARKER)
    .map(|(i, _)| i)
    .collect();

  let marker = match markers.as_slice() {
    [] => return Err(ExperimentError::parse(source_name, "no build scan was published")),
    [one] => *one,
    many => {
      return Err(ExperimentError::parse(
        source_name,
        format!("expected one build scan, found {}", many.len()),
      ))
    }
  };

  let url_line = lines[marker + 1..]
    .iter()
    .find(|l| !l.trim().is_empty())
    .ok_or_else(|| ExperimentError::parse(source_name, "build scan marker is not followed by a URL"))?;

  parse_scan_url(url_line)
    .ok_or_else(|| ExperimentError::parse(source_name, format!("malformed build scan URL '{}'", url_line.trim())))
}

/// Extract the scans of both builds; the ids must differ.
pub fn extract_pair(first_output: &str, second_output: &str) -> Result<(ScanResult, ScanResult), ExperimentError> {
  let first = extract_scan("first build", first_output)?;
  let second = extract_scan("second build", second_output)?;
  if first.scan_id == second.scan_id {
    return Err(ExperimentError::parse(
      "second build",
      format!("scan id {} repeats the first build's scan", second.scan_id),
    ));
  }
  Ok((first, second))
}
