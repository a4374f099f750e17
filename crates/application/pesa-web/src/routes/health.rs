use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/health", get(api_health))
}

async fn api_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let signed_in = state.user.read().await.is_some();
    let watching = state.watch.read().await.is_some();
    Json(json!({
        "status": "ok",
        "backend_configured": state.config.is_configured(),
        "signed_in": signed_in,
        "watching": watching,
    }))
}
