//! String-to-number conversion for the semantic columns. Every row yields a
//! `Record`; unparsable values become `None` (or 0 for the spill count) and
//! are reported instead of raised.

use crate::data::RawRow;
use crate::diagnostics::{Diagnostic, NumericField};
use crate::types::Record;

pub fn coerce_rows(rows: &[RawRow]) -> (Vec<Record>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let records = rows
        .iter()
        .map(|row| coerce_row(row, &mut diagnostics))
        .collect();
    (records, diagnostics)
}

pub fn coerce_row(row: &RawRow, diagnostics: &mut Vec<Diagnostic>) -> Record {
    let mut float = |field: NumericField, column: &str, raw: &str| {
        let parsed = parse_float(raw);
        if parsed.is_none() {
            diagnostics.push(Diagnostic::ParseFailure {
                line: row.line,
                field,
                raw: row.text(column).to_string(),
            });
        }
        parsed
    };

    let spills_duration = float(NumericField::SpillsDuration, "spills_duration", row.text("spills_duration"));
    let monitoring = float(
        NumericField::Monitoring,
        "monitoring",
        row.text("monitoring").replace('%', "").as_str(),
    );
    let lat = float(NumericField::Lat, "lat", row.text("lat"));
    let lng = float(NumericField::Lng, "lng", row.text("lng"));

    let spills_count = match parse_int_prefix(row.text("spills_count")) {
        Some(count) => count,
        None => {
            diagnostics.push(Diagnostic::ParseFailure {
                line: row.line,
                field: NumericField::SpillsCount,
                raw: row.text("spills_count").to_string(),
            });
            0
        }
    };

    Record {
        line: row.line,
        site_name: row.text("site_name").to_string(),
        asset_type: row.text("asset_type").to_string(),
        receiving_water: row.text("receiving_water").to_string(),
        spills_duration,
        spills_count,
        monitoring,
        lat,
        lng,
    }
}

/// Finite floats only; surrounding whitespace is ignored.
pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Leading-digit integer parse: `"12.7"` and `"12 spills"` both give 12.
/// Runs too long for `u64` saturate.
pub fn parse_int_prefix(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    let run = &digits[..end];
    if run.is_empty() {
        return None;
    }
    Some(run.parse().unwrap_or(u64::MAX))
}
