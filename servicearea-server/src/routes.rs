use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::routing::{get, post};
use axum::{BoxError, Json, Router};
use geo::Point;
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use servicearea_core::{NodeKey, ServiceAreaComputer};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/snap", post(snap_handler))
        .route("/service-area/nodes", post(service_area_nodes_handler))
        .route("/service-area/polygons", post(service_area_polygons_handler))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .concurrency_limit(config.max_concurrency)
                .timeout(Duration::from_secs(config.request_timeout_secs)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

async fn handle_middleware_error(error: BoxError) -> (StatusCode, String) {
    if error.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unhandled internal error: {error}"),
        )
    }
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    status: String,
    nodes: usize,
    edges: usize,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let graph = state.computer.graph();
    Json(HealthResponse {
        status: "ok".to_string(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    })
}

#[derive(Deserialize)]
pub struct SnapRequest {
    /// `[lon, lat]` pairs
    points: Vec<[f64; 2]>,
}

#[derive(Serialize, Deserialize)]
pub struct NodesResponse {
    nodes: Vec<NodeKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<NodeKey>,
}

async fn snap_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SnapRequest>,
) -> Result<Json<NodesResponse>, ApiError> {
    let points: Vec<Point<f64>> = body
        .points
        .iter()
        .map(|&[lon, lat]| Point::new(lon, lat))
        .collect();
    let computer = state.computer.clone();

    let nodes = tokio::task::spawn_blocking(move || computer.snap_points(&points)).await??;

    Ok(Json(NodesResponse {
        nodes,
        skipped: Vec::new(),
    }))
}

#[derive(Deserialize)]
pub struct ServiceAreaRequest {
    nodes: Vec<NodeKey>,
    /// Overrides the configured radius
    radius: Option<f64>,
}

fn computer_for(
    state: &AppState,
    radius: Option<f64>,
) -> Result<ServiceAreaComputer, ApiError> {
    match radius {
        Some(radius) => Ok(state.computer.with_radius(radius)?),
        None => Ok(state.computer.clone()),
    }
}

async fn service_area_nodes_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ServiceAreaRequest>,
) -> Result<Json<NodesResponse>, ApiError> {
    let computer = computer_for(&state, body.radius)?;

    let (covered, skipped) = tokio::task::spawn_blocking(move || {
        computer.service_area_nodes_with_skipped(&body.nodes)
    })
    .await?;

    let mut nodes: Vec<NodeKey> = covered.into_iter().collect();
    nodes.sort_unstable();

    Ok(Json(NodesResponse {
        nodes,
        skipped: skipped.iter().map(|failure| failure.node()).collect(),
    }))
}

async fn service_area_polygons_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ServiceAreaRequest>,
) -> Result<Json<FeatureCollection>, ApiError> {
    let computer = computer_for(&state, body.radius)?;

    let collection =
        tokio::task::spawn_blocking(move || computer.service_area_polygons(&body.nodes)).await?;

    if !collection.skipped().is_empty() {
        tracing::debug!(
            "{} of the requested nodes produced no polygon",
            collection.skipped().len()
        );
    }

    Ok(Json(collection.to_geojson()?))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use servicearea_core::{ServiceAreaConfig, StreetGraphBuilder};
    use tower::ServiceExt;

    use super::*;

    fn test_app() -> Router {
        let mut builder = StreetGraphBuilder::new();
        builder.add_node(1, 0.0, 0.0).unwrap();
        builder.add_node(2, 0.0, 1.0).unwrap();
        builder.add_node(3, 1.0, 1.0).unwrap();
        builder.add_node(4, 1.0, 0.0).unwrap();
        for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 1)] {
            builder.add_edge(a, b, 1.0).unwrap();
            builder.add_edge(b, a, 1.0).unwrap();
        }
        let computer = ServiceAreaComputer::new(
            Arc::new(builder.build()),
            ServiceAreaConfig::new(1.0, "EPSG:4326"),
        )
        .unwrap();

        router(Arc::new(AppState { computer }), &ServerConfig::default())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["nodes"], 4);
        assert_eq!(body["edges"], 8);
    }

    #[tokio::test]
    async fn test_snap() {
        let response = test_app()
            .oneshot(post_json(
                "/snap",
                serde_json::json!({"points": [[0.1, 0.1], [0.9, 0.8]]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["nodes"], serde_json::json!([1, 3]));
    }

    #[tokio::test]
    async fn test_service_area_nodes() {
        let response = test_app()
            .oneshot(post_json(
                "/service-area/nodes",
                serde_json::json!({"nodes": [1, 77]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["nodes"], serde_json::json!([1, 2, 4]));
        assert_eq!(body["skipped"], serde_json::json!([77]));
    }

    #[tokio::test]
    async fn test_service_area_polygons_with_radius_override() {
        let response = test_app()
            .oneshot(post_json(
                "/service-area/polygons",
                serde_json::json!({"nodes": [1, 3], "radius": 2.0}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().unwrap().len(), 2);
        assert_eq!(body["crs"]["properties"]["name"], "EPSG:4326");
    }

    #[tokio::test]
    async fn test_invalid_radius() {
        let response = test_app()
            .oneshot(post_json(
                "/service-area/polygons",
                serde_json::json!({"nodes": [1], "radius": -3.0}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_snap_on_empty_graph() {
        let computer = ServiceAreaComputer::new(
            Arc::new(StreetGraphBuilder::new().build()),
            ServiceAreaConfig::default(),
        )
        .unwrap();
        let app = router(Arc::new(AppState { computer }), &ServerConfig::default());

        let response = app
            .oneshot(post_json("/snap", serde_json::json!({"points": [[0.0, 0.0]]})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
