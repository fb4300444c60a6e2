//! RelayChat server - streaming chat relay
//!
//! Accepts a chat turn plus history from the browser, opens a streaming
//! completion upstream and relays each delta as a normalized event.

pub mod api;
pub mod config;

use api::{AppState, chat::chat};
use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

#[derive(serde::Serialize)]
struct Health {
    status: String,
}

async fn health() -> axum::Json<Health> {
    axum::Json(Health {
        status: "relaychat is working!".to_string(),
    })
}

/// Build the HTTP router around an injected provider client.
pub fn router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .layer(cors)
        .with_state(state)
}
