//! Comma-delimited encoding of export rows.
//!
//! The column order and value spellings are read by existing analysis
//! scripts: `Display` is `True` for the visual record and `False` for the
//! numeric summary, whole floats keep a trailing `.0`, and records end in
//! CRLF.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::ExportRow;
use crate::core::errors::{BeadsError, Result};

/// Header row; stable across versions.
pub const COLUMNS: [&str; 12] = [
    "Subject",
    "Trial",
    "HiddenColor",
    "Display",
    "Ratio",
    "BeadPosition",
    "Sequence",
    "MajorityBeads",
    "ProbEstimate",
    "FinalChoice",
    "EvidenceAsymmetry",
    "Accuracy",
];

const TERMINATOR: &str = "\r\n";

/// Write the header and every row.
pub fn write_csv<W: Write>(rows: &[ExportRow], out: &mut W) -> io::Result<()> {
    write_record(out, COLUMNS.iter().map(|c| (*c).to_string()))?;
    for row in rows {
        write_record(out, row_fields(row))?;
    }
    Ok(())
}

/// Write `rows` to `path` (header only when empty), creating the parent
/// directory. Returns the number of data rows.
pub fn write_results_file(path: &Path, rows: &[ExportRow]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BeadsError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| BeadsError::io(path, e))?;
    let mut out = BufWriter::new(file);
    write_csv(rows, &mut out).map_err(|e| BeadsError::io(path, e))?;
    let file = out
        .into_inner()
        .map_err(|e| BeadsError::io(path, e.into_error()))?;
    file.sync_all().map_err(|e| BeadsError::io(path, e))?;
    Ok(rows.len())
}

fn row_fields(row: &ExportRow) -> impl Iterator<Item = String> {
    [
        row.subject.clone(),
        row.trial.to_string(),
        row.hidden_color.to_string(),
        (if row.display.as_flag() { "True" } else { "False" }).to_string(),
        row.ratio.to_string(),
        row.bead_position.to_string(),
        row.sequence.clone(),
        row.majority_beads.to_string(),
        format_float(row.prob_estimate),
        row.final_choice.to_string(),
        format_float(row.evidence_asymmetry),
        row.accuracy.to_string(),
    ]
    .into_iter()
}

fn write_record<W: Write>(out: &mut W, fields: impl Iterator<Item = String>) -> io::Result<()> {
    let line = fields.map(|f| quote(&f)).collect::<Vec<_>>().join(",");
    out.write_all(line.as_bytes())?;
    out.write_all(TERMINATOR.as_bytes())
}

/// Minimal quoting: only fields holding a delimiter, quote, or line break.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Shortest round-trip form, keeping `.0` on whole numbers.
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
