use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Extension, Json,
};
use klanavo_core::SearchFilters;
use klanavo_search::RouteSearchRequest;
use serde::Deserialize;

use super::{record_visitor, ApiError, AppState, PeerAddr};
use crate::middleware::RequestId;

const DEFAULT_RADIUS_KM: u32 = 10;

/// Query string of the single-location search.
#[derive(Debug, Deserialize)]
pub(super) struct InserateQuery {
    query: Option<String>,
    location: Option<String>,
    radius: Option<u32>,
    min_price: Option<u32>,
    max_price: Option<u32>,
    category: Option<u32>,
    page_count: Option<u32>,
}

impl InserateQuery {
    fn into_filters(self) -> SearchFilters {
        SearchFilters {
            query: self.query.filter(|q| !q.trim().is_empty()),
            location: self.location,
            radius_km: Some(self.radius.unwrap_or(DEFAULT_RADIUS_KM)),
            min_price: self.min_price,
            max_price: self.max_price,
            category_id: self.category,
            page_count: self.page_count.unwrap_or(1),
        }
    }
}

pub(super) async fn inserate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<InserateQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) =
        query.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;
    let filters = query.into_filters();

    let response = state
        .search
        .search(&filters)
        .await
        .map_err(|e| ApiError::from_search(req_id.0.clone(), &e))?;
    Ok(Json(response))
}

pub(super) async fn route_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    peer: PeerAddr,
    body: Result<Json<RouteSearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let response = state
        .search
        .route_search(&request)
        .await
        .map_err(|e| ApiError::from_search(req_id.0.clone(), &e))?;
    record_visitor(&state, &headers, peer);
    Ok(Json(response))
}
