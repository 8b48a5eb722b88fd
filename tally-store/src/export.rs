//! CSV export of the feedback history (one row per event).

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tally_core::LedgerSnapshot;

#[derive(Debug, Serialize)]
struct Row<'a> {
    field: &'a str,
    original_value: &'a str,
    corrected_value: &'a str,
    was_correct: bool,
    original_confidence: f64,
    recorded_at: String,
}

/// Write `snapshot` as CSV with a header row. Returns the number of events written.
pub fn write_history_csv<W: Write>(snapshot: &LedgerSnapshot, out: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(out);
    let mut n = 0;
    for (field, records) in &snapshot.fields {
        for r in records {
            wtr.serialize(Row {
                field,
                original_value: &r.original_value,
                corrected_value: r.corrected_value.as_deref().unwrap_or(""),
                was_correct: r.was_correct,
                original_confidence: r.original_confidence,
                recorded_at: r.recorded_at.to_rfc3339(),
            })
            .with_context(|| format!("writing {field} row"))?;
            n += 1;
        }
    }
    wtr.flush().context("flushing csv")?;
    Ok(n)
}

pub fn export_history_csv(snapshot: &LedgerSnapshot, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let f = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_history_csv(snapshot, f).with_context(|| format!("exporting to {}", path.display()))
}
