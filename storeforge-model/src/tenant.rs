use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::ids::TenantId;

const GIB: u64 = 1024 * 1024 * 1024;

/// Subscription plan a tenant is provisioned under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl Default for Plan {
    fn default() -> Self {
        Plan::Free
    }
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Basic => "basic",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        }
    }

    /// Advisory storage quota for the plan. Metadata only, not enforced by
    /// the storage layer.
    pub fn quota_bytes(&self) -> u64 {
        match self {
            Plan::Free => GIB,
            Plan::Basic => 10 * GIB,
            Plan::Pro => 100 * GIB,
            Plan::Enterprise => 1024 * GIB,
        }
    }

    /// Feature flags carried into the tenant context.
    pub fn features(&self) -> Vec<String> {
        let flags: &[&str] = match self {
            Plan::Free => &["storefront"],
            Plan::Basic => &["storefront", "custom_domain"],
            Plan::Pro => &["storefront", "custom_domain", "analytics"],
            Plan::Enterprise => {
                &["storefront", "custom_domain", "analytics", "priority_support"]
            }
        };
        flags.iter().map(|f| f.to_string()).collect()
    }
}

impl FromStr for Plan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "basic" => Ok(Plan::Basic),
            "pro" => Ok(Plan::Pro),
            "enterprise" => Ok(Plan::Enterprise),
            other => Err(ValidationError::UnknownPlan(other.to_string())),
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a registered tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
    Pending,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Suspended => "suspended",
            TenantStatus::Pending => "pending",
        }
    }
}

impl FromStr for TenantStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(TenantStatus::Active),
            "suspended" => Ok(TenantStatus::Suspended),
            "pending" => Ok(TenantStatus::Pending),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Row in the public (cross-tenant) tenant registry.
///
/// Written exactly once, after every provisioning step has succeeded; no
/// other subsystem may observe a tenant before that write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRecord {
    pub id: TenantId,
    pub subdomain: String,
    pub display_name: String,
    pub plan: Plan,
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
}

// Plan/status live in TEXT columns; decode through FromStr rather than a
// Postgres enum type.
impl sqlx::FromRow<'_, sqlx::postgres::PgRow> for TenantRecord {
    fn from_row(row: &sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        let plan: String = row.try_get("plan")?;
        let status: String = row.try_get("status")?;

        Ok(TenantRecord {
            id: row.try_get("id")?,
            subdomain: row.try_get("subdomain")?,
            display_name: row.try_get("display_name")?,
            plan: plan
                .parse()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            status: status
                .parse()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            created_at: row.try_get("created_at")?,
        })
    }
}
