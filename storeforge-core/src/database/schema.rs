//! Tenant schema lifecycle against Postgres.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use storeforge_model::naming;

use crate::error::{ProvisionError, Result};
use crate::ports::SchemaLifecycle;
use crate::types::SchemaHandle;

#[derive(Debug, Clone)]
pub struct SchemaManager {
    pool: PgPool,
}

impl SchemaManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn schema_exists(&self, schema: &str) -> Result<bool> {
        let found: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM information_schema.schemata WHERE schema_name = $1",
        )
        .bind(schema)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }

    async fn table_count(&self, schema: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = $1",
        )
        .bind(schema)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl SchemaLifecycle for SchemaManager {
    async fn create(&self, subdomain: &str) -> Result<SchemaHandle> {
        let schema = naming::schema_name(subdomain)?;
        let started = Instant::now();

        if self.schema_exists(&schema).await? {
            return Err(ProvisionError::AlreadyExists(format!(
                "schema {schema}"
            )));
        }

        sqlx::raw_sql(&format!("CREATE SCHEMA \"{schema}\""))
            .execute(&self.pool)
            .await?;
        sqlx::raw_sql(&format!(
            "GRANT ALL ON SCHEMA \"{schema}\" TO CURRENT_USER"
        ))
        .execute(&self.pool)
        .await?;

        info!(
            schema = %schema,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "created tenant schema"
        );

        Ok(SchemaHandle {
            schema_name: schema,
            exists: true,
            table_count: 0,
        })
    }

    async fn verify(&self, subdomain: &str) -> Result<SchemaHandle> {
        let schema = naming::schema_name(subdomain)?;
        let exists = self.schema_exists(&schema).await?;
        let table_count = if exists {
            self.table_count(&schema).await?
        } else {
            0
        };

        Ok(SchemaHandle {
            schema_name: schema,
            exists,
            table_count,
        })
    }

    async fn drop_schema(
        &self,
        subdomain: &str,
        verify_empty: bool,
    ) -> Result<bool> {
        let schema = naming::schema_name(subdomain)?;

        if !self.schema_exists(&schema).await? {
            debug!(schema = %schema, "drop requested for absent schema");
            return Ok(false);
        }

        if verify_empty {
            let tables = self.table_count(&schema).await?;
            if tables > 0 {
                return Err(ProvisionError::NotEmpty(format!(
                    "schema {schema} holds {tables} table(s)"
                )));
            }
        }

        sqlx::raw_sql(&format!("DROP SCHEMA \"{schema}\" CASCADE"))
            .execute(&self.pool)
            .await?;

        info!(schema = %schema, forced = !verify_empty, "dropped tenant schema");
        Ok(true)
    }
}
