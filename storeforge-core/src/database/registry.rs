//! Public (cross-tenant) tenant registry.
//!
//! `public.tenants` is the one table provisioning writes outside a tenant's
//! own schema, and the write happens only after every other step succeeded.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use storeforge_model::TenantRecord;

use crate::error::Result;
use crate::ports::TenantRegistry;

/// Creates the registry table when missing. Run once at startup.
pub async fn ensure_registry(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS public.tenants (
            id           UUID PRIMARY KEY,
            subdomain    VARCHAR(30) UNIQUE NOT NULL,
            display_name VARCHAR(255) NOT NULL,
            plan         VARCHAR(16) NOT NULL,
            status       VARCHAR(16) NOT NULL,
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::raw_sql(
        "CREATE INDEX IF NOT EXISTS tenants_status_idx ON public.tenants(status)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[derive(Debug, Clone)]
pub struct PostgresTenantRegistry {
    pool: PgPool,
}

impl PostgresTenantRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRegistry for PostgresTenantRegistry {
    async fn insert(&self, record: &TenantRecord) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO public.tenants (id, subdomain, display_name, plan, status, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(record.id.to_uuid())
        .bind(&record.subdomain)
        .bind(&record.display_name)
        .bind(record.plan.as_str())
        .bind(record.status.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            subdomain = %record.subdomain,
            tenant_id = %record.id,
            plan = %record.plan,
            "registered tenant"
        );
        Ok(())
    }

    async fn find_by_subdomain(
        &self,
        subdomain: &str,
    ) -> Result<Option<TenantRecord>> {
        let record = sqlx::query_as::<_, TenantRecord>(
            r#"SELECT id, subdomain, display_name, plan, status, created_at
               FROM public.tenants WHERE subdomain = $1"#,
        )
        .bind(subdomain)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn exists(&self, subdomain: &str) -> Result<bool> {
        let found: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM public.tenants WHERE subdomain = $1",
        )
        .bind(subdomain)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }
}
