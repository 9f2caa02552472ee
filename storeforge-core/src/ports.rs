//! Port traits the orchestrator drives. Each has a production adapter
//! (Postgres or filesystem) and a mock in the unit tests.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use storeforge_model::{Plan, TenantRecord};

use crate::error::Result;
use crate::types::{
    AuditEvent, BucketSpec, MigrationReport, SchemaHandle, SeedOutcome,
    SeedRequest, StorageBucketHandle,
};

/// Create/verify/drop a tenant's database schema namespace.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SchemaLifecycle: Send + Sync {
    async fn create(&self, subdomain: &str) -> Result<SchemaHandle>;

    /// Read-only introspection, usable for pre-flight checks and by
    /// compensation logic.
    async fn verify(&self, subdomain: &str) -> Result<SchemaHandle>;

    /// Returns `false` when the schema does not exist. With `verify_empty`
    /// the drop fails if any table is present; compensation always passes
    /// `false` because partially-migrated state must go.
    async fn drop_schema(
        &self,
        subdomain: &str,
        verify_empty: bool,
    ) -> Result<bool>;
}

/// Applies the fixed baseline table set into a tenant schema.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SchemaMigrator: Send + Sync {
    async fn run(&self, subdomain: &str) -> Result<MigrationReport>;
}

/// Inserts the initial admin user, store record and default settings.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TenantSeeder: Send + Sync {
    async fn seed(&self, request: &SeedRequest) -> Result<SeedOutcome>;

    /// Cheap existence probe. Never errors outward: a failing query means
    /// "not seeded".
    async fn is_seeded(&self, subdomain: &str) -> bool;
}

/// Create/delete a tenant's isolated asset bucket.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BucketLifecycle: Send + Sync {
    async fn create(
        &self,
        subdomain: &str,
        plan: Plan,
    ) -> Result<StorageBucketHandle>;

    /// Returns `false` when the bucket does not exist. Without `force` the
    /// delete fails if the bucket holds any object.
    async fn delete(&self, subdomain: &str, force: bool) -> Result<bool>;
}

/// The public (cross-tenant) tenant registry. The registration insert is the
/// only write outside a tenant's own schema during provisioning.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TenantRegistry: Send + Sync {
    async fn insert(&self, record: &TenantRecord) -> Result<()>;

    async fn find_by_subdomain(
        &self,
        subdomain: &str,
    ) -> Result<Option<TenantRecord>>;

    async fn exists(&self, subdomain: &str) -> Result<bool>;
}

/// Audit-log sink. Persistence lives outside this repository; the trait is
/// the boundary.
#[cfg_attr(test, automock)]
pub trait AuditSink: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// Raw object-storage backend the bucket manager sits on.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Creates the bucket with its metadata. The caller checks for
    /// collisions first.
    async fn create_bucket(&self, spec: &BucketSpec) -> Result<()>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
    ) -> Result<()>;

    /// Lists object keys in the bucket, metadata excluded.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>>;

    /// Removes the bucket and everything in it.
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;
}
