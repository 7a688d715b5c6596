use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Numeric columns that go through coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    SpillsDuration,
    SpillsCount,
    Monitoring,
    Lat,
    Lng,
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NumericField::SpillsDuration => "spills_duration",
            NumericField::SpillsCount => "spills_count",
            NumericField::Monitoring => "monitoring",
            NumericField::Lat => "lat",
            NumericField::Lng => "lng",
        };
        f.write_str(name)
    }
}

/// Recoverable, per-record problems. None of these stop the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    #[error("line {line}: expected {expected} fields, found {found}; row skipped")]
    MalformedRow { line: u64, expected: usize, found: usize },

    #[error("line {line}: unreadable row ({reason}); row skipped")]
    UnreadableRow { line: u64, reason: String },

    #[error("line {line}: could not parse {field} from {raw:?}")]
    ParseFailure { line: u64, field: NumericField, raw: String },

    #[error("line {line}: asset type {asset_type:?} matches no shape prefix; drawn as a circle")]
    ClassificationFallback { line: u64, asset_type: String },

    #[error("spill durations have no spread across {samples} records; sizing every marker at {size_px}px")]
    DegenerateStatistics { samples: usize, size_px: f64 },

    #[error("line {line}: no usable coordinates; marker and heat point omitted")]
    Unplaceable { line: u64 },
}

impl Diagnostic {
    pub fn log(&self) {
        match self {
            Diagnostic::ClassificationFallback { .. } => debug!("{}", self),
            _ => warn!("{}", self),
        }
    }
}

pub fn log_all(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        d.log();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failure_names_field_and_raw_text() {
        let d = Diagnostic::ParseFailure {
            line: 7,
            field: NumericField::SpillsDuration,
            raw: "n/a".to_string(),
        };
        assert_eq!(d.to_string(), "line 7: could not parse spills_duration from \"n/a\"");
    }
}
