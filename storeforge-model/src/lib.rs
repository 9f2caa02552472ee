//! Core data model definitions shared across Storeforge crates.
#![allow(missing_docs)]

pub mod context;
pub mod error;
pub mod ids;
pub mod naming;
pub mod tenant;

// Intentionally curated re-exports for downstream consumers.
pub use context::TenantContext;
pub use error::{ValidationError, ValidationResult};
pub use ids::{AdminId, TenantId};
pub use naming::{bucket_name, sanitize_subdomain, schema_name};
pub use tenant::{Plan, TenantRecord, TenantStatus};
