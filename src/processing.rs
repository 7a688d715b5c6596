use crate::classify::{color_for_monitoring, shape_for_asset, FALLBACK_SHAPE};
use crate::config::AppConfig;
use crate::diagnostics::Diagnostic;
use crate::stats::SpillNormalizer;
use crate::types::{Dataset, HeatPoint, IconDescriptor, Marker, SiteSummary, ViewFrame};
use geo::Coord;
use tracing::info;

/// Everything the composer needs, derived from one dataset.
#[derive(Debug, Clone)]
pub struct ProcessedMap {
    pub view: ViewFrame,
    pub max_duration: Option<f64>,
    pub markers: Vec<Marker>,
    pub heat_points: Vec<HeatPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Mean of every placeable coordinate. `None` when nothing can be placed.
pub fn view_frame(dataset: &Dataset, zoom: u8) -> Option<ViewFrame> {
    let (sum, n) = dataset
        .records()
        .iter()
        .filter_map(|r| r.position())
        .fold((Coord { x: 0.0, y: 0.0 }, 0usize), |(acc, n), p| (acc + p.0, n + 1));

    if n == 0 {
        return None;
    }
    let center = sum / n as f64;
    Some(ViewFrame {
        center: [center.y, center.x],
        zoom,
    })
}

/// Largest parsed duration across the whole dataset, placeable or not.
pub fn max_duration(dataset: &Dataset) -> Option<f64> {
    dataset.durations().reduce(f64::max)
}

/// Classify and size every placeable record. Returns `None` when no record
/// has usable coordinates.
pub fn process_data(config: &AppConfig, dataset: &Dataset) -> Option<ProcessedMap> {
    info!("Processing {} records into map layers...", dataset.len());

    let view = view_frame(dataset, config.map.zoom)?;
    let max_duration = max_duration(dataset);

    let mut diagnostics = Vec::new();
    let (normalizer, degenerate) = SpillNormalizer::fit(dataset, config.map.size_range);
    diagnostics.extend(degenerate);
    if let Some(stats) = normalizer.stats() {
        info!(
            "Spill duration mean {:.2}h, std dev {:.2}h, z-range [{:.2}, {:.2}]",
            stats.mean, stats.std_dev, stats.normalized_min, stats.normalized_max
        );
    }

    let mut markers = Vec::with_capacity(dataset.len());
    let mut heat_points = Vec::new();

    for record in dataset.records() {
        let Some(point) = record.position() else {
            diagnostics.push(Diagnostic::Unplaceable { line: record.line });
            continue;
        };

        let shape = shape_for_asset(&record.asset_type).unwrap_or_else(|| {
            diagnostics.push(Diagnostic::ClassificationFallback {
                line: record.line,
                asset_type: record.asset_type.clone(),
            });
            FALLBACK_SHAPE
        });

        markers.push(Marker {
            point,
            icon: IconDescriptor {
                shape,
                size_px: normalizer.size_px(record.spills_duration),
                color: color_for_monitoring(record.monitoring),
                opacity: config.map.opacity,
            },
            summary: SiteSummary::from(record),
        });

        if let Some(spills_duration) = record.spills_duration {
            heat_points.push(HeatPoint {
                lat: point.y(),
                lng: point.x(),
                spills_duration,
            });
        }
    }

    info!(
        "Built {} markers and {} heat points centred on ({:.4}, {:.4})",
        markers.len(),
        heat_points.len(),
        view.center[0],
        view.center[1]
    );

    Some(ProcessedMap {
        view,
        max_duration,
        markers,
        heat_points,
        diagnostics,
    })
}
