//! Core library for Storeforge - tenant provisioning saga, schema and
//! bucket lifecycle, and tenant context propagation.
#![allow(missing_docs)]

pub mod audit;
pub mod context;
pub mod database;
pub mod error;
pub mod orchestrator;
pub mod ports;
pub mod saga;
pub mod storage;
pub mod types;

pub use audit::TracingAuditSink;
pub use context::{
    current_context, has_context, require_context, spawn_with_current,
    with_context,
};
pub use database::{
    MigrationRunner, PostgresTenantRegistry, SchemaManager, Seeder,
    connect_pool, ensure_registry,
};
pub use error::{ProvisionError, Result};
pub use orchestrator::Provisioner;
pub use ports::{
    AuditSink, BucketLifecycle, ObjectStore, SchemaLifecycle, SchemaMigrator,
    TenantRegistry, TenantSeeder,
};
pub use storage::{BucketManager, FsObjectStore};
pub use types::{
    AuditEvent, BucketSpec, MigrationReport, ProvisionReceipt,
    ProvisionRequest, SchemaHandle, SeedOutcome, SeedRequest,
    StorageBucketHandle,
};
