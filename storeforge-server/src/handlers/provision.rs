use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use storeforge_core::ProvisionRequest;
use storeforge_model::Plan;

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionBody {
    pub subdomain: String,
    pub store_name: String,
    pub admin_email: String,
    pub plan: Option<String>,
}

/// `POST /provision`: provisions a complete tenant environment.
pub async fn handle_provision(
    State(state): State<AppState>,
    Json(body): Json<ProvisionBody>,
) -> AppResult<impl IntoResponse> {
    let plan = body
        .plan
        .as_deref()
        .map(str::parse::<Plan>)
        .transpose()?
        .unwrap_or_default();

    let receipt = state
        .provisioner
        .provision(&ProvisionRequest {
            subdomain: body.subdomain,
            store_name: body.store_name,
            admin_email: body.admin_email,
            // HTTP callers get a generated temporary credential; it is
            // returned once in this response and never stored in plain form.
            admin_password: None,
            plan,
        })
        .await
        .map_err(|e| AppError::from_provision(e, state.config.dev_mode))?;

    let activation_url = format!(
        "https://{}.{}/",
        receipt.subdomain, state.config.base_domain
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Tenant provisioned",
            "data": {
                "subdomain": receipt.subdomain,
                "activationUrl": activation_url,
                "durationMs": receipt.duration.as_millis() as u64,
                "adminId": receipt.admin_id,
                "temporaryPassword": receipt.generated_password,
            }
        })),
    ))
}
