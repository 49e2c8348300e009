//! Recorded guide traces.
//!
//! Expected headers:
//! measurement,exposure_ms
//!
//! Example:
//! measurement,exposure_ms
//! 0.42,2000
//! ,2000
//! -0.13,2000
//!
//! An empty measurement marks a cycle without a usable star (dropped frame).
use serde::Deserialize;
use std::path::Path;

/// One guide cycle of a recorded trace.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TraceRow {
    /// Measured position error for the cycle; `None` for a dropped frame
    pub measurement: Option<f64>,
    /// Requested exposure duration in milliseconds
    pub exposure_ms: u32,
}

pub fn load_trace_csv(path: &Path) -> eyre::Result<Vec<TraceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["measurement", "exposure_ms"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "trace CSV must have headers 'measurement,exposure_ms', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TraceRow>().enumerate() {
        let line = idx + 2;
        match rec {
            Ok(row) if row.measurement.is_some_and(|m| !m.is_finite()) => {
                eyre::bail!("invalid CSV row {}: measurement must be finite", line);
            }
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", line, e);
            }
        }
    }

    if rows.is_empty() {
        eyre::bail!("trace CSV {:?} contains no rows", path);
    }
    Ok(rows)
}
