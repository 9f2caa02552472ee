//! Initial data for a freshly migrated tenant schema.

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use storeforge_model::{AdminId, naming};

use crate::error::{ProvisionError, Result};
use crate::ports::TenantSeeder;
use crate::types::{SeedOutcome, SeedRequest};

const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("currency", "USD"),
    ("locale", "en-US"),
    ("timezone", "UTC"),
    ("checkout_enabled", "true"),
];

const GENERATED_PASSWORD_LEN: usize = 20;

#[derive(Debug, Clone)]
pub struct Seeder {
    pool: PgPool,
}

impl Seeder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                ProvisionError::Failed(format!("password hashing failed: {e}"))
            })?;
        Ok(hash.to_string())
    }

    fn generate_password() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_PASSWORD_LEN)
            .map(char::from)
            .collect()
    }
}

#[async_trait]
impl TenantSeeder for Seeder {
    async fn seed(&self, request: &SeedRequest) -> Result<SeedOutcome> {
        let schema = naming::schema_name(&request.subdomain)?;

        let generated_password = match request.admin_password {
            Some(_) => None,
            None => Some(Self::generate_password()),
        };
        let password = request
            .admin_password
            .as_deref()
            .or(generated_password.as_deref())
            .unwrap_or_default();
        let password_hash = Self::hash_password(password)?;

        let admin_id = AdminId::new();
        let store_id = Uuid::new_v4();

        // Three ordered inserts; any failure aborts the transaction and the
        // orchestrator's schema drop removes whatever landed.
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            r#"INSERT INTO "{schema}".users (id, email, password_hash, role)
               VALUES ($1, $2, $3, 'admin')"#
        ))
        .bind(admin_id.to_uuid())
        .bind(&request.admin_email)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            r#"INSERT INTO "{schema}".stores (id, name, owner_id)
               VALUES ($1, $2, $3)"#
        ))
        .bind(store_id)
        .bind(&request.store_name)
        .bind(admin_id.to_uuid())
        .execute(&mut *tx)
        .await?;

        for (key, value) in DEFAULT_SETTINGS {
            sqlx::query(&format!(
                r#"INSERT INTO "{schema}".store_settings (key, value)
                   VALUES ($1, $2)"#
            ))
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            schema = %schema,
            admin = %request.admin_email,
            "seeded tenant schema"
        );

        Ok(SeedOutcome {
            admin_id,
            generated_password,
        })
    }

    async fn is_seeded(&self, subdomain: &str) -> bool {
        let Ok(schema) = naming::schema_name(subdomain) else {
            return false;
        };

        let probe: std::result::Result<i64, sqlx::Error> = sqlx::query_scalar(
            &format!(
                r#"SELECT COUNT(*) FROM "{schema}".users WHERE role = 'admin'"#
            ),
        )
        .fetch_one(&self.pool)
        .await;

        match probe {
            Ok(count) => count > 0,
            Err(e) => {
                // A failing probe means "not seeded", never an error.
                debug!(schema = %schema, error = %e, "seed probe failed");
                false
            }
        }
    }
}
