pub mod migrate;
pub mod registry;
pub mod schema;
pub mod seed;

pub use migrate::MigrationRunner;
pub use registry::{PostgresTenantRegistry, ensure_registry};
pub use schema::SchemaManager;
pub use seed::Seeder;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::Result;

/// Connects the shared pool every component addresses tenant schemas
/// through. The cross-tenant default schema is only ever touched by the
/// registry.
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}
