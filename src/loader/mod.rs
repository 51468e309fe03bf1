//! CSV loader for daily price history (`Date,Close,Volume` plus any extra columns).

use crate::models::{Dataset, PriceRecord};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV header has no `{0}` column")]
    MissingColumn(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// ── Parsers ───────────────────────────────────────────────────────────────────

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Parse a numeric cell. An empty cell reads as `0.0`; anything that is not a
/// finite number (including `inf`/`NaN` spellings) becomes `NaN`.
pub fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => f64::NAN,
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Read and parse the CSV at `path`. Rendering waits on this.
pub async fn load_dataset(path: &Path) -> Result<Dataset> {
    debug!("Loading price history from {:?}", path);

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;

    let dataset = parse_csv(bytes.as_slice())
        .with_context(|| format!("Failed to parse {:?}", path))?;

    info!("{:?}: {} records loaded", path, dataset.len());
    Ok(dataset)
}

/// Parse CSV text into a `Dataset`, keeping file order.
///
/// Rows with an unreadable date are skipped. Unreadable Close/Volume cells are
/// kept as `NaN` so the row still occupies its slot in the series.
pub fn parse_csv<R: Read>(input: R) -> std::result::Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))
    };
    let date_col = column("Date")?;
    let close_col = column("Close")?;
    let volume_col = column("Volume")?;

    let mut records = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {}: {}", i + 1, e);
                continue;
            }
        };

        let raw_date = row.get(date_col).unwrap_or_default();
        let Some(date) = parse_date(raw_date) else {
            warn!("Row {}: unreadable date {:?}, skipped", i + 1, raw_date);
            continue;
        };

        let close = parse_number(row.get(close_col).unwrap_or_default());
        let volume = parse_number(row.get(volume_col).unwrap_or_default());
        if close.is_nan() || volume.is_nan() {
            warn!("Row {} ({}): non-numeric Close/Volume", i + 1, date);
        }

        records.push(PriceRecord::new(date, close, volume));
    }

    Ok(Dataset::new(records))
}
