use geo::Point;
use serde::Serialize;

/// One storm overflow row after coercion. Numeric fields that failed to
/// parse are `None`; the matching `Diagnostic` is reported alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based line number in the source file, for diagnostics.
    pub line: u64,
    pub site_name: String,
    pub asset_type: String,
    pub receiving_water: String,
    pub spills_duration: Option<f64>, // hours
    pub spills_count: u64,
    pub monitoring: Option<f64>, // percent, unclamped
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Record {
    /// Map position as a `geo` point (x = lng, y = lat).
    pub fn position(&self) -> Option<Point<f64>> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Point::new(lng, lat)),
            _ => None,
        }
    }
}

/// The records of one input file, fixed once ingestion finishes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Durations that parsed, in record order.
    pub fn durations(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().filter_map(|r| r.spills_duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Circle,
    UpTriangle,
    DownTriangle,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerColor {
    Green,
    Orange,
    Red,
}

impl MarkerColor {
    pub fn hex(self) -> &'static str {
        match self {
            MarkerColor::Green => "#04A40B",
            MarkerColor::Orange => "#FF5F1F",
            MarkerColor::Red => "#FF0000",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IconDescriptor {
    pub shape: ShapeKind,
    pub size_px: f64,
    pub color: MarkerColor,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewFrame {
    pub center: [f64; 2], // [lat, lng]
    pub zoom: u8,
}

/// Text shown in a marker's detail panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteSummary {
    pub site_name: String,
    pub receiving_water: String,
    pub spills_duration: Option<f64>,
    pub spills_count: u64,
    pub monitoring: Option<f64>,
    pub asset_type: String,
}

impl From<&Record> for SiteSummary {
    fn from(record: &Record) -> Self {
        Self {
            site_name: record.site_name.clone(),
            receiving_water: record.receiving_water.clone(),
            spills_duration: record.spills_duration,
            spills_count: record.spills_count,
            monitoring: record.monitoring,
            asset_type: record.asset_type.clone(),
        }
    }
}

/// A placed, classified marker ready for composition.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub point: Point<f64>,
    pub icon: IconDescriptor,
    pub summary: SiteSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    pub spills_duration: f64,
}
