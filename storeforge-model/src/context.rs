use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ValidationResult;
use crate::ids::TenantId;
use crate::naming;
use crate::tenant::{Plan, TenantRecord, TenantStatus};

/// Immutable identity of the tenant the current operation acts on behalf of.
///
/// All fields are private and there are no setters: once constructed a
/// context can only be read, cloned, or shadowed by installing a new one in
/// a nested scope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantContext {
    tenant_id: TenantId,
    subdomain: String,
    schema_name: String,
    plan: Plan,
    is_active: bool,
    features: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TenantContext {
    /// Builds a context from explicit parts. Used by the orchestrator for
    /// its own internal calls, before a registry record exists.
    pub fn new(
        tenant_id: TenantId,
        subdomain: impl Into<String>,
        schema_name: impl Into<String>,
        plan: Plan,
        is_active: bool,
    ) -> Self {
        Self {
            tenant_id,
            subdomain: subdomain.into(),
            schema_name: schema_name.into(),
            plan,
            is_active,
            features: plan.features(),
            created_at: Utc::now(),
        }
    }

    /// Builds a context for a registered tenant, deriving the schema name
    /// from the record's subdomain.
    pub fn for_record(record: &TenantRecord) -> ValidationResult<Self> {
        let schema_name = naming::schema_name(&record.subdomain)?;
        Ok(Self::new(
            record.id,
            record.subdomain.clone(),
            schema_name,
            record.plan,
            record.status == TenantStatus::Active,
        ))
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn has_feature(&self, flag: &str) -> bool {
        self.features.iter().any(|f| f == flag)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
