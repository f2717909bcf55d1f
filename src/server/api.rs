use crate::models::{ RelayRequest, RelayResponse };
use crate::relay::{ Relay, RelayError };
use std::sync::Arc;
use axum::{
    body::Bytes,
    routing::{ get, post },
    Router,
    extract::{ DefaultBodyLimit, State },
    response::{ IntoResponse, Response },
    http::StatusCode,
    Json,
};
use serde_json::json;
use tower_http::cors::{ Any, CorsLayer };
use log::debug;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler).layer(DefaultBodyLimit::disable()))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

// Decoded by hand and without a size cap: conversations are forwarded
// whole, and a body that is not valid JSON gets the 500 `{ error }`
// envelope instead of axum's rejection.
async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request: RelayRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            return RelayError::InternalError(format!("invalid request body: {}", e)).into_response();
        }
    };

    debug!("Relaying conversation of {} turn(s)", request.messages.len());

    match state.relay.handle(request).await {
        Ok(content) => (StatusCode::OK, Json(RelayResponse::Success { content })).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
