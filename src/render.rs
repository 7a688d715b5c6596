use crate::config::{AppConfig, HeatConfig};
use crate::processing::ProcessedMap;
use crate::types::{HeatPoint, Marker, ShapeKind, SiteSummary, ViewFrame};
use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde::Serialize;
use std::fs;
use tracing::info;

const INDEX_HTML: &str = include_str!("templates/index.html");

const STREET_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const STREET_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
const SATELLITE_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
const SATELLITE_ATTRIBUTION: &str = "Tiles &copy; Esri &mdash; Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community";

/// Parameters handed to the browser-side map renderer.
#[derive(Debug, Clone, Serialize)]
pub struct MapDocument {
    pub view: ViewFrame,
    pub base_layers: Vec<BaseLayer>,
    pub markers: MarkerLayer,
    pub heat: HeatLayer,
}

#[derive(Debug, Clone, Serialize)]
pub struct BaseLayer {
    pub name: &'static str,
    pub url: &'static str,
    pub attribution: &'static str,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerLayer {
    pub name: &'static str,
    pub visible: bool,
    pub markers: Vec<MarkerSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerSpec {
    pub lat: f64,
    pub lng: f64,
    pub icon: IconSpec,
    pub popup_html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IconSpec {
    pub shape: ShapeKind,
    pub size_px: f64,
    pub color: &'static str,
    pub opacity: f64,
    pub anchor: [f64; 2],
    pub svg: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatLayer {
    pub name: &'static str,
    pub visible: bool,
    pub options: HeatOptions,
    pub data: HeatData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatOptions {
    pub radius: f64,
    pub max_opacity: f64,
    pub blur: f64,
    pub scale_radius: bool,
    pub use_local_extrema: bool,
    pub lat_field: &'static str,
    pub lng_field: &'static str,
    pub value_field: &'static str,
}

impl From<&HeatConfig> for HeatOptions {
    fn from(heat: &HeatConfig) -> Self {
        Self {
            radius: heat.radius,
            max_opacity: heat.max_opacity,
            blur: heat.blur,
            scale_radius: true,
            use_local_extrema: true,
            lat_field: "lat",
            lng_field: "lng",
            value_field: "spills_duration",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatData {
    pub max: f64,
    pub data: Vec<HeatPoint>,
}

pub fn compose(config: &AppConfig, processed: &ProcessedMap) -> MapDocument {
    MapDocument {
        view: processed.view,
        base_layers: vec![
            BaseLayer {
                name: "Street",
                url: STREET_URL,
                attribution: STREET_ATTRIBUTION,
                visible: true,
            },
            BaseLayer {
                name: "Satellite",
                url: SATELLITE_URL,
                attribution: SATELLITE_ATTRIBUTION,
                visible: false,
            },
        ],
        markers: MarkerLayer {
            name: "Markers",
            visible: true,
            markers: processed.markers.iter().map(marker_spec).collect(),
        },
        heat: HeatLayer {
            name: "Heat",
            visible: false,
            options: HeatOptions::from(&config.heat),
            data: HeatData {
                max: processed.max_duration.unwrap_or(0.0),
                data: processed.heat_points.clone(),
            },
        },
    }
}

fn marker_spec(marker: &Marker) -> MarkerSpec {
    let icon = &marker.icon;
    let color = icon.color.hex();
    MarkerSpec {
        lat: marker.point.y(),
        lng: marker.point.x(),
        icon: IconSpec {
            shape: icon.shape,
            size_px: icon.size_px,
            color,
            opacity: icon.opacity,
            anchor: [icon.size_px / 2.0, icon.size_px / 2.0],
            svg: svg_icon(icon.shape, icon.size_px, color, icon.opacity),
        },
        popup_html: popup_html(&marker.summary),
    }
}

/// Marker layer as GeoJSON points with the icon and summary as properties.
pub fn markers_geojson(processed: &ProcessedMap) -> FeatureCollection {
    let features = processed
        .markers
        .iter()
        .map(|marker| {
            let mut properties = JsonObject::new();
            properties.insert("icon".to_string(), serde_json::to_value(&marker.icon).unwrap_or_default());
            properties.insert("summary".to_string(), serde_json::to_value(&marker.summary).unwrap_or_default());
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![marker.point.x(), marker.point.y()]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Write `index.html`, `map.json` and `markers.geojson` into the output dir.
pub fn generate_bundle(config: &AppConfig, processed: &ProcessedMap) -> Result<()> {
    let out_dir = &config.output.dir;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    let document = compose(config, processed);
    let map_json = serde_json::to_string(&document).context("Failed to serialize map parameters")?;
    let geojson = GeoJson::from(markers_geojson(processed)).to_string();

    for (name, contents) in [
        ("index.html", INDEX_HTML.to_string()),
        ("map.json", map_json),
        ("markers.geojson", geojson),
    ] {
        let path = out_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    }

    info!(
        "Wrote {} markers and {} heat points to {:?}",
        document.markers.markers.len(),
        document.heat.data.data.len(),
        out_dir
    );
    Ok(())
}

/// SVG markup in a 100x100 viewBox, stretched to `size` pixels.
pub fn svg_icon(shape: ShapeKind, size: f64, fill: &str, opacity: f64) -> String {
    let body = match shape {
        ShapeKind::Circle => format!(
            r#"<circle cx="50" cy="50" r="50" fill-opacity="{}" fill="{}"></circle>"#,
            opacity, fill
        ),
        ShapeKind::DownTriangle => format!(
            r#"<path d="M0 0 L50 100 L100 0 Z" fill-opacity="{}" fill="{}"></path>"#,
            opacity, fill
        ),
        ShapeKind::Square => format!(
            r#"<rect width="100" height="100" fill-opacity="{}" fill="{}"></rect>"#,
            opacity, fill
        ),
        ShapeKind::UpTriangle => format!(
            r#"<path d="M50 0 L0 100 L100 100 Z" fill-opacity="{}" fill="{}"></path>"#,
            opacity, fill
        ),
    };
    format!(
        r#"<svg width="{size}" height="{size}" viewBox="0 0 100 100" version="1.1" preserveAspectRatio="none" xmlns="http://www.w3.org/2000/svg">{body}</svg>"#,
        size = size,
        body = body
    )
}

pub fn popup_html(summary: &SiteSummary) -> String {
    format!(
        concat!(
            r#"<div class="popup">"#,
            "<p><b>Site Name:</b> {}</p>",
            "<p><b>Receiving Water:</b> {}</p>",
            "<p><b>Spills duration (hrs):</b> {}</p>",
            "<p><b>Spills count:</b> {}</p>",
            "<p><b>Monitoring:</b> {}</p>",
            "<p><b>Asset Type:</b> {}</p>",
            "</div>"
        ),
        escape_html(&summary.site_name),
        escape_html(&summary.receiving_water),
        or_na(summary.spills_duration, ""),
        summary.spills_count,
        or_na(summary.monitoring, "%"),
        escape_html(&summary.asset_type),
    )
}

fn or_na(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{}{}", v, suffix),
        None => "n/a".to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
