use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};

use super::{record_visitor, AppState, PeerAddr};

pub(super) async fn usage_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: PeerAddr,
) -> impl IntoResponse {
    record_visitor(&state, &headers, peer);
    Json(state.search.stats().snapshot())
}
