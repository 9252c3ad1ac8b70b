use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{BoxError, Json, Router};
use geo::Coord;
use geojson::FeatureCollection;
use pedalsafe_core::prelude::*;
use pedalsafe_core::routing::{DEFAULT_DESTINATION, DEFAULT_START};
use serde::Deserialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub network: Arc<BikeNetwork>,
}

impl AppState {
    pub fn new(network: BikeNetwork) -> Self {
        AppState {
            network: Arc::new(network),
        }
    }
}

/// Coordinate field that may arrive as a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CoordinateValue {
    Number(f64),
    Text(String),
}

impl CoordinateValue {
    fn resolve(value: Option<&Self>, default: f64, field: &str) -> Result<f64, Error> {
        match value {
            None => Ok(default),
            Some(CoordinateValue::Number(number)) => Ok(*number),
            Some(CoordinateValue::Text(text)) => text.trim().parse().map_err(|_| {
                Error::MalformedQuery(format!("{field} must be a number, got {text:?}"))
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    start_lon: Option<CoordinateValue>,
    start_lat: Option<CoordinateValue>,
    dest_lon: Option<CoordinateValue>,
    dest_lat: Option<CoordinateValue>,
    #[serde(default)]
    mode: Option<StyleMode>,
}

impl RouteRequest {
    fn coordinates(&self) -> Result<(Coord<f64>, Coord<f64>), Error> {
        let start = Coord {
            x: CoordinateValue::resolve(self.start_lon.as_ref(), DEFAULT_START.x, "start_lon")?,
            y: CoordinateValue::resolve(self.start_lat.as_ref(), DEFAULT_START.y, "start_lat")?,
        };
        let destination = Coord {
            x: CoordinateValue::resolve(self.dest_lon.as_ref(), DEFAULT_DESTINATION.x, "dest_lon")?,
            y: CoordinateValue::resolve(self.dest_lat.as_ref(), DEFAULT_DESTINATION.y, "dest_lat")?,
        };
        Ok((start, destination))
    }
}

pub enum ApiError {
    Engine(Error),
    Task(tokio::task::JoinError),
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError::Engine(error)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(error: tokio::task::JoinError) -> Self {
        ApiError::Task(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Engine(Error::MalformedQuery(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match self {
            ApiError::Engine(error) => error.to_string(),
            ApiError::Task(error) => error.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(error = %message, "Route planning failed");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Planning and rendering run on the blocking pool
async fn plan_request(
    state: AppState,
    payload: Result<Json<RouteRequest>, JsonRejection>,
    forced_mode: Option<StyleMode>,
) -> Result<Json<FeatureCollection>, ApiError> {
    let Json(request) = payload.map_err(|rejection| Error::MalformedQuery(rejection.body_text()))?;
    let (start, destination) = request.coordinates()?;
    let mode = forced_mode.or(request.mode).unwrap_or_default();

    let network = state.network;
    let collection = tokio::task::spawn_blocking(move || {
        let styled = plan_route(&network, start, destination, mode)?;
        tracing::debug!(
            start = ?(start.x, start.y),
            destination = ?(destination.x, destination.y),
            ?mode,
            segments = styled.segments.len(),
            "Planned route"
        );
        styled.to_geojson()
    })
    .await??;

    Ok(Json(collection))
}

async fn route(
    State(state): State<AppState>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<FeatureCollection>, ApiError> {
    plan_request(state, payload, None).await
}

async fn blue_route(
    State(state): State<AppState>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<FeatureCollection>, ApiError> {
    plan_request(state, payload, Some(StyleMode::Uniform)).await
}

async fn colored_route(
    State(state): State<AppState>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<FeatureCollection>, ApiError> {
    plan_request(state, payload, Some(StyleMode::Risk)).await
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "nodes": state.network.node_count(),
        "edges": state.network.edge_count(),
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/route", post(route))
        .route("/blue", post(blue_route))
        .route("/colored", post(colored_route))
        .route("/health", get(health))
        .with_state(state)
}

async fn handle_middleware_error(error: BoxError) -> (StatusCode, String) {
    if error.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "request timed out".to_string())
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("service unavailable: {error}"),
        )
    }
}

/// Router with tracing, CORS, timeout and concurrency limits
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    router(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .concurrency_limit(config.max_concurrent_requests),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
