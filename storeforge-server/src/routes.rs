use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::handlers::{handle_provision, handle_tenant_info};
use crate::infra::app_state::AppState;
use crate::middleware::tenant_gate;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/provision", post(handle_provision))
        .route("/tenant", get(handle_tenant_info))
        .route("/health", get(health))
        .layer(middleware::from_fn_with_state(state.clone(), tenant_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
