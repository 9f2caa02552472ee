//! Tenant resolution & isolation gate.
//!
//! Every inbound request passes through here. Requests addressed to the
//! root domain (or a reserved name such as `www`) carry no tenant identity
//! and pass straight through without touching the registry. Anything else
//! must resolve to an active registered tenant, whose context is installed
//! for the rest of the request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use storeforge_core::{current_context, with_context};
use storeforge_model::{TenantContext, TenantId, TenantStatus};

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

/// Host names that never resolve to a tenant.
const RESERVED_SUBDOMAINS: &[&str] = &["www", "api", "admin", "mail"];

/// Identity of the authenticated caller, injected into request extensions
/// by the outer authentication collaborator.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    pub user_id: Uuid,
    pub tenant_id: Option<TenantId>,
    pub super_admin: bool,
}

pub async fn tenant_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let Some(subdomain) = resolve_subdomain(host, &state.config.base_domain)
    else {
        // Root domain or reserved name: no tenant context, allowed through.
        debug!(host = %host, "request bypasses tenant gate");
        return Ok(next.run(request).await);
    };

    let record = state
        .registry
        .find_by_subdomain(&subdomain)
        .await
        .map_err(|e| AppError::from_provision(e, state.config.dev_mode))?
        .ok_or_else(|| AppError::unauthorized("Unknown tenant"))?;

    match record.status {
        TenantStatus::Active => {}
        TenantStatus::Suspended => {
            return Err(AppError::unauthorized("Tenant account is suspended"));
        }
        other => {
            return Err(AppError::unauthorized(format!(
                "Tenant account is {other}"
            )));
        }
    }

    let context = TenantContext::for_record(&record)?;
    Ok(with_context(context, next.run(request)).await)
}

/// Extracts the tenant subdomain from a Host header, if any.
///
/// The root domain, reserved names, anything outside the configured base
/// domain, and multi-label prefixes all resolve to "no subdomain".
pub fn resolve_subdomain(host: &str, base_domain: &str) -> Option<String> {
    let hostname = host.split(':').next().unwrap_or(host).trim().to_lowercase();
    if hostname.is_empty() || hostname == base_domain {
        return None;
    }

    let candidate = hostname.strip_suffix(&format!(".{base_domain}"))?;
    if candidate.is_empty()
        || candidate.contains('.')
        || RESERVED_SUBDOMAINS.contains(&candidate)
    {
        return None;
    }

    Some(candidate.to_string())
}

/// Guard: the current operation must run under an active tenant context.
pub fn require_active_tenant() -> AppResult<Arc<TenantContext>> {
    let context = current_context()
        .ok_or_else(|| AppError::unauthorized("Tenant context required"))?;
    if !context.is_active() {
        return Err(AppError::unauthorized("Tenant account is not active"));
    }
    Ok(context)
}

/// Guard: like [`require_active_tenant`], but additionally checks that the
/// caller belongs to the installed tenant. A super admin bypasses the
/// cross-tenant check.
pub fn require_tenant_access(
    principal: &AuthPrincipal,
) -> AppResult<Arc<TenantContext>> {
    let context = require_active_tenant()?;

    if principal.super_admin {
        return Ok(context);
    }

    match principal.tenant_id {
        Some(id) if id == context.tenant_id() => Ok(context),
        _ => Err(AppError::forbidden("Cross-tenant access denied")),
    }
}
