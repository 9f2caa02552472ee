//! Baseline migration set for a tenant schema.
//!
//! The runner pins `search_path` to the target schema for the whole
//! transaction, so every statement lands inside the tenant's namespace and
//! never in the cross-tenant default schema. Failures propagate unchanged;
//! recovery is the orchestrator's schema-drop compensation.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use storeforge_model::naming;

use crate::error::Result;
use crate::ports::SchemaMigrator;
use crate::types::MigrationReport;

/// The store-platform baseline, applied in order. FKs are unqualified and
/// resolve within the pinned schema.
const BASELINE_TABLES: &[(&str, &str)] = &[
    (
        "users",
        r#"CREATE TABLE users (
            id            UUID PRIMARY KEY,
            email         VARCHAR(255) UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            role          VARCHAR(32) NOT NULL DEFAULT 'staff',
            is_active     BOOLEAN NOT NULL DEFAULT TRUE,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "stores",
        r#"CREATE TABLE stores (
            id         UUID PRIMARY KEY,
            name       VARCHAR(255) NOT NULL,
            owner_id   UUID NOT NULL REFERENCES users(id),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "store_settings",
        r#"CREATE TABLE store_settings (
            key        VARCHAR(128) PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "products",
        r#"CREATE TABLE products (
            id          UUID PRIMARY KEY,
            store_id    UUID NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
            title       VARCHAR(255) NOT NULL,
            description TEXT,
            price_cents BIGINT NOT NULL CHECK (price_cents >= 0),
            inventory   INTEGER NOT NULL DEFAULT 0,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "orders",
        r#"CREATE TABLE orders (
            id          UUID PRIMARY KEY,
            store_id    UUID NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
            email       VARCHAR(255) NOT NULL,
            total_cents BIGINT NOT NULL CHECK (total_cents >= 0),
            status      VARCHAR(32) NOT NULL DEFAULT 'pending',
            created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "order_items",
        r#"CREATE TABLE order_items (
            id         UUID PRIMARY KEY,
            order_id   UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            product_id UUID NOT NULL REFERENCES products(id),
            quantity   INTEGER NOT NULL CHECK (quantity > 0),
            unit_cents BIGINT NOT NULL CHECK (unit_cents >= 0)
        )"#,
    ),
];

#[derive(Debug, Clone)]
pub struct MigrationRunner {
    pool: PgPool,
}

impl MigrationRunner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Number of tables in the baseline set.
    pub fn baseline_len() -> usize {
        BASELINE_TABLES.len()
    }
}

#[async_trait]
impl SchemaMigrator for MigrationRunner {
    async fn run(&self, subdomain: &str) -> Result<MigrationReport> {
        let schema = naming::schema_name(subdomain)?;
        let started = Instant::now();

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("SET LOCAL search_path TO \"{schema}\""))
            .execute(&mut *tx)
            .await?;

        let mut applied_count = 0usize;
        for (_table, ddl) in BASELINE_TABLES {
            sqlx::query(ddl).execute(&mut *tx).await?;
            applied_count += 1;
        }

        tx.commit().await?;

        let duration = started.elapsed();
        info!(
            schema = %schema,
            applied = applied_count,
            elapsed_ms = duration.as_millis() as u64,
            "applied baseline migrations"
        );

        Ok(MigrationReport {
            schema_name: schema,
            applied_count,
            duration,
        })
    }
}
