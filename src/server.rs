use crate::config::AppConfig;
use crate::types::{Marker, SiteSummary};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

// Marker position for R-tree lookup, stored as [lng, lat]
pub struct SiteIndex {
    index: usize,
    position: [f64; 2],
}

impl RTreeObject for SiteIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for SiteIndex {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

pub struct AppState {
    pub markers: Vec<Marker>,
    pub tree: RTree<SiteIndex>,
}

impl AppState {
    pub fn new(markers: Vec<Marker>) -> Self {
        let items = markers
            .iter()
            .enumerate()
            .map(|(index, m)| SiteIndex {
                index,
                position: [m.point.x(), m.point.y()],
            })
            .collect();
        Self {
            tree: RTree::bulk_load(items),
            markers,
        }
    }

    pub fn nearest(&self, lat: f64, lon: f64) -> Option<QueryResponse> {
        let hit = self.tree.nearest_neighbor(&[lon, lat])?;
        let marker = self.markers.get(hit.index)?;
        Some(QueryResponse {
            lat: marker.point.y(),
            lng: marker.point.x(),
            summary: marker.summary.clone(),
        })
    }
}

#[derive(Deserialize)]
pub struct QueryParams {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    lat: f64,
    lng: f64,
    summary: SiteSummary,
}

pub async fn start_server(config: AppConfig, markers: Vec<Marker>) -> Result<()> {
    info!("Building spatial index for {} sites...", markers.len());
    let state = Arc::new(AppState::new(markers));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server.port));
    info!("Starting server on http://{}", addr);

    let app = Router::new()
        .route("/api/query", get(query_handler))
        .fallback_service(ServeDir::new(&config.output.dir))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Json<Option<QueryResponse>> {
    Json(state.nearest(params.lat, params.lon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::process_data;
    use crate::processing::tests::{record, test_config};
    use crate::types::Dataset;

    #[test]
    fn nearest_site_is_returned() {
        let mut far = record("Inlet SO", Some(1.0), Some(95.0), Some(54.0), Some(-1.0));
        far.site_name = "Far".to_string();
        let mut near = record("Storm tank", Some(9.0), Some(95.0), Some(51.4), Some(-2.4));
        near.site_name = "Near".to_string();
        let processed = process_data(&test_config(), &Dataset::new(vec![far, near])).unwrap();

        let state = AppState::new(processed.markers);
        let hit = state.nearest(51.38, -2.36).unwrap();

        assert_eq!(hit.summary.site_name, "Near");
        assert_eq!(hit.lat, 51.4);
    }

    #[test]
    fn empty_index_has_no_answer() {
        let state = AppState::new(Vec::new());
        assert!(state.nearest(51.0, -2.0).is_none());
    }
}
