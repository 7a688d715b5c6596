use crate::coerce::coerce_rows;
use crate::config::AppConfig;
use crate::diagnostics::Diagnostic;
use crate::types::Dataset;
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use tracing::info;

/// Column count of the overflow return layout.
pub const EXPECTED_COLUMNS: usize = 29;

/// Positional renames applied over the header row. Every other column keeps
/// its header text.
pub const COLUMN_REMAP: [(usize, &str); 8] = [
    (1, "site_name"),
    (6, "asset_type"),
    (10, "receiving_water"),
    (15, "spills_duration"),
    (16, "spills_count"),
    (19, "monitoring"),
    (27, "lat"),
    (28, "lng"),
];

/// One data row keyed by (remapped) column name.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: u64,
    values: HashMap<String, String>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Missing columns read as empty text.
    pub fn text(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }
}

pub struct Ingested {
    pub dataset: Dataset,
    pub rows_read: usize,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn load_data(config: &AppConfig) -> Result<Ingested> {
    let file = File::open(&config.input.data_csv)
        .with_context(|| format!("Failed to open CSV file: {:?}", config.input.data_csv))?;
    let ingested = ingest(file)
        .with_context(|| format!("Failed to read CSV file: {:?}", config.input.data_csv))?;

    info!(
        rows = ingested.rows_read,
        records = ingested.dataset.len(),
        diagnostics = ingested.diagnostics.len(),
        "loaded overflow data"
    );
    Ok(ingested)
}

/// Parse and coerce a whole file in one pass.
pub fn ingest<R: Read>(reader: R) -> Result<Ingested> {
    let (rows, mut diagnostics) = read_rows(reader)?;
    let rows_read = rows.len() + diagnostics.len();
    let (records, coerce_diagnostics) = coerce_rows(&rows);
    diagnostics.extend(coerce_diagnostics);

    Ok(Ingested {
        dataset: Dataset::new(records),
        rows_read,
        diagnostics,
    })
}

/// Rows whose width differs from the fixed layout are skipped and reported.
pub fn read_rows<R: Read>(reader: R) -> Result<(Vec<RawRow>, Vec<Diagnostic>)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .quote(b'"')
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("CSV has no header row")?.clone();
    let names: Vec<String> = (0..EXPECTED_COLUMNS)
        .map(|i| column_name(i, headers.get(i).unwrap_or("")))
        .collect();

    let mut rows = Vec::new();
    let mut diagnostics = Vec::new();

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            // the bad record is already consumed, so reading can go on
            Err(err) if matches!(err.kind(), csv::ErrorKind::Utf8 { .. }) => {
                diagnostics.push(Diagnostic::UnreadableRow {
                    line: err.position().map(|p| p.line()).unwrap_or(0),
                    reason: err.to_string(),
                });
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != EXPECTED_COLUMNS {
            diagnostics.push(Diagnostic::MalformedRow {
                line,
                expected: EXPECTED_COLUMNS,
                found: record.len(),
            });
            continue;
        }

        let values = names
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();
        rows.push(RawRow { line, values });
    }

    Ok((rows, diagnostics))
}

fn column_name(index: usize, header: &str) -> String {
    COLUMN_REMAP
        .iter()
        .find(|(i, _)| *i == index)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| header.to_string())
}
