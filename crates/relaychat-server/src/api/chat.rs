use crate::api::{ApiError, AppState, relay::relay_events};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, header},
    response::{IntoResponse, Response, Sse},
};
use relaychat_contracts::ChatRequest;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected chat request body");
        ApiError::bad_request(rejection.body_text())
    })?;

    let turns = request.into_turns();
    tracing::info!(
        provider = state.llm.provider(),
        model = state.llm.model(),
        turns = turns.len(),
        "Relaying chat turn"
    );

    let deltas = state.llm.stream_completion(turns).await.map_err(|e| {
        tracing::error!(error = %e, status = ?e.upstream_status(), "Upstream stream could not be opened");
        ApiError::from(e)
    })?;

    let headers = [
        (
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-transform"),
        ),
        (header::CONNECTION, HeaderValue::from_static("keep-alive")),
        (X_ACCEL_BUFFERING, HeaderValue::from_static("no")),
    ];

    Ok((headers, Sse::new(relay_events(deltas))).into_response())
}
