//! Operation payloads and result shapes shared across the core components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use storeforge_model::{AdminId, Plan, TenantId};

/// Result of creating or inspecting a tenant schema.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaHandle {
    pub schema_name: String,
    pub exists: bool,
    pub table_count: i64,
}

/// Result of creating a tenant asset bucket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageBucketHandle {
    pub bucket_name: String,
    pub region: String,
    pub quota_bytes: u64,
    pub versioning_enabled: bool,
}

/// Outcome of applying the baseline migration set into a schema.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub schema_name: String,
    pub applied_count: usize,
    pub duration: Duration,
}

/// Input for seeding a freshly migrated tenant schema.
#[derive(Debug, Clone)]
pub struct SeedRequest {
    pub subdomain: String,
    pub admin_email: String,
    /// When absent a temporary credential is generated and returned once in
    /// the outcome.
    pub admin_password: Option<String>,
    pub store_name: String,
}

/// Outcome of seeding: the generated administrator id, plus the temporary
/// password when the seeder had to invent one.
#[derive(Debug, Clone)]
pub struct SeedOutcome {
    pub admin_id: AdminId,
    pub generated_password: Option<String>,
}

/// Everything the orchestrator needs to provision one tenant.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub subdomain: String,
    pub store_name: String,
    pub admin_email: String,
    pub admin_password: Option<String>,
    pub plan: Plan,
}

/// Returned to the caller after a fully successful provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionReceipt {
    pub tenant_id: TenantId,
    pub subdomain: String,
    pub schema_name: String,
    pub bucket_name: String,
    pub admin_id: AdminId,
    pub generated_password: Option<String>,
    pub duration: Duration,
}

/// Desired shape of a bucket, handed to the object store backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSpec {
    pub name: String,
    pub region: String,
    pub quota_bytes: u64,
    pub versioning_enabled: bool,
    /// Objects under this key prefix are publicly readable; everything else
    /// stays private.
    pub public_read_prefix: Option<String>,
    pub tags: BTreeMap<String, String>,
}

/// One structured event handed to the audit sink.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub kind: &'static str,
    pub subdomain: String,
    pub tenant_id: Option<TenantId>,
    pub detail: serde_json::Value,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn provisioning_completed(
        subdomain: impl Into<String>,
        tenant_id: TenantId,
        detail: serde_json::Value,
    ) -> Self {
        Self {
            kind: "provisioning-completed",
            subdomain: subdomain.into(),
            tenant_id: Some(tenant_id),
            detail,
            at: Utc::now(),
        }
    }
}
