mod search;
mod stats;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::ConnectInfo,
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use klanavo_search::{RouteSearch, SearchError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{admission_throttle, request_id, AdmissionGate};

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<RouteSearch>,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn from_search(request_id: String, error: &SearchError) -> Self {
        match error {
            SearchError::InvalidRequest(_) => {
                tracing::debug!(error = %error, "rejected invalid request");
            }
            SearchError::ConfigurationMissing(_) => {
                tracing::error!(error = %error, "search unavailable: configuration missing");
            }
            _ => tracing::warn!(error = %error, "search failed upstream"),
        }
        Self::new(request_id, error.code(), error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "validation_error" => StatusCode::BAD_REQUEST,
            "geocoding_failed" | "routing_failed" | "fetch_failed" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Proxy headers consulted, in order, before falling back to the peer address.
const CLIENT_IP_HEADERS: [&str; 4] = [
    "x-forwarded-for",
    "x-real-ip",
    "cf-connecting-ip",
    "true-client-ip",
];

/// Socket peer, present when the server runs with connect info.
type PeerAddr = Option<Extension<ConnectInfo<SocketAddr>>>;

/// Best-effort client address: first entry of `X-Forwarded-For`, then the
/// single-value proxy headers, then the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    CLIENT_IP_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(',').next())
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_owned)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

/// Counts the caller as a visitor when any address is known.
fn record_visitor(state: &AppState, headers: &HeaderMap, peer: PeerAddr) {
    let peer = peer.map(|Extension(ConnectInfo(addr))| addr);
    if let Some(ip) = client_ip(headers, peer) {
        state.search.stats().record_visitor(&ip);
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn throttled_router(gate: AdmissionGate) -> Router<AppState> {
    Router::new()
        .route("/inserate", get(search::inserate))
        .route("/api/inserate", get(search::inserate))
        .route("/route-search", post(search::route_search))
        .route("/api/route-search", post(search::route_search))
        .route("/stats", get(stats::usage_stats))
        .route("/api/stats", get(stats::usage_stats))
        .layer(axum::middleware::from_fn_with_state(
            gate,
            admission_throttle,
        ))
}

pub fn build_app(state: AppState, gate: AdmissionGate) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(throttled_router(gate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthData { status: "ok" })
}

#[must_use]
pub fn admission_gate(interval_ms: u64) -> AdmissionGate {
    AdmissionGate::new(Duration::from_millis(interval_ms))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
