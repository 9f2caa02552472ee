use axum::{Json, response::IntoResponse};
use serde_json::json;

use crate::errors::AppResult;
use crate::middleware::require_active_tenant;

/// `GET /tenant`: identity of the tenant the current request runs under.
/// Fails when the gate installed no context (root-domain requests).
pub async fn handle_tenant_info() -> AppResult<impl IntoResponse> {
    let context = require_active_tenant()?;

    Ok(Json(json!({
        "data": {
            "tenantId": context.tenant_id(),
            "subdomain": context.subdomain(),
            "plan": context.plan().as_str(),
            "features": context.features(),
        }
    })))
}
