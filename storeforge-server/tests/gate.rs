//! End-to-end tests for the tenant isolation gate and the provisioning
//! endpoint, running the real router against in-memory port fakes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::Value;

use storeforge_core::{
    AuditEvent, AuditSink, BucketLifecycle, MigrationReport, Provisioner,
    SchemaHandle, SchemaLifecycle, SchemaMigrator, SeedOutcome, SeedRequest,
    StorageBucketHandle, TenantRegistry, TenantSeeder,
};
use storeforge_model::{
    AdminId, Plan, TenantId, TenantRecord, TenantStatus, bucket_name,
    schema_name,
};
use storeforge_server::{AppState, Config, build_router};

/// Registry fake backed by a map, counting lookups so tests can assert the
/// gate never queries it for root-domain traffic.
#[derive(Default)]
struct FakeRegistry {
    tenants: Mutex<HashMap<String, TenantRecord>>,
    lookups: AtomicUsize,
}

impl FakeRegistry {
    fn with_tenant(subdomain: &str, status: TenantStatus) -> Self {
        let registry = Self::default();
        registry.tenants.lock().unwrap().insert(
            subdomain.to_string(),
            TenantRecord {
                id: TenantId::new(),
                subdomain: subdomain.to_string(),
                display_name: "Coffee Beans".to_string(),
                plan: Plan::Basic,
                status,
                created_at: Utc::now(),
            },
        );
        registry
    }

    fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TenantRegistry for FakeRegistry {
    async fn insert(&self, record: &TenantRecord) -> storeforge_core::Result<()> {
        self.tenants
            .lock()
            .unwrap()
            .insert(record.subdomain.clone(), record.clone());
        Ok(())
    }

    async fn find_by_subdomain(
        &self,
        subdomain: &str,
    ) -> storeforge_core::Result<Option<TenantRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.tenants.lock().unwrap().get(subdomain).cloned())
    }

    async fn exists(&self, subdomain: &str) -> storeforge_core::Result<bool> {
        Ok(self.tenants.lock().unwrap().contains_key(subdomain))
    }
}

struct StubSchemas;

#[async_trait]
impl SchemaLifecycle for StubSchemas {
    async fn create(
        &self,
        subdomain: &str,
    ) -> storeforge_core::Result<SchemaHandle> {
        Ok(SchemaHandle {
            schema_name: schema_name(subdomain)?,
            exists: true,
            table_count: 0,
        })
    }

    async fn verify(
        &self,
        subdomain: &str,
    ) -> storeforge_core::Result<SchemaHandle> {
        Ok(SchemaHandle {
            schema_name: schema_name(subdomain)?,
            exists: false,
            table_count: 0,
        })
    }

    async fn drop_schema(
        &self,
        _subdomain: &str,
        _verify_empty: bool,
    ) -> storeforge_core::Result<bool> {
        Ok(false)
    }
}

struct StubMigrator;

#[async_trait]
impl SchemaMigrator for StubMigrator {
    async fn run(
        &self,
        subdomain: &str,
    ) -> storeforge_core::Result<MigrationReport> {
        Ok(MigrationReport {
            schema_name: schema_name(subdomain)?,
            applied_count: 6,
            duration: Duration::from_millis(1),
        })
    }
}

struct StubBuckets;

#[async_trait]
impl BucketLifecycle for StubBuckets {
    async fn create(
        &self,
        subdomain: &str,
        plan: Plan,
    ) -> storeforge_core::Result<StorageBucketHandle> {
        Ok(StorageBucketHandle {
            bucket_name: bucket_name(subdomain)?,
            region: "local".to_string(),
            quota_bytes: plan.quota_bytes(),
            versioning_enabled: true,
        })
    }

    async fn delete(
        &self,
        _subdomain: &str,
        _force: bool,
    ) -> storeforge_core::Result<bool> {
        Ok(false)
    }
}

struct StubSeeder;

#[async_trait]
impl TenantSeeder for StubSeeder {
    async fn seed(
        &self,
        _request: &SeedRequest,
    ) -> storeforge_core::Result<SeedOutcome> {
        Ok(SeedOutcome {
            admin_id: AdminId::new(),
            generated_password: Some("temp-credential".to_string()),
        })
    }

    async fn is_seeded(&self, _subdomain: &str) -> bool {
        false
    }
}

struct NoopAudit;

impl AuditSink for NoopAudit {
    fn log(&self, _event: AuditEvent) {}
}

fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://sf:sf@localhost/storeforge".to_string(),
        max_connections: 1,
        storage_root: PathBuf::from("/tmp/storeforge-test"),
        storage_region: "local".to_string(),
        base_domain: "shops.example".to_string(),
        dev_mode: false,
    }
}

fn build_server(registry: Arc<FakeRegistry>) -> Result<TestServer> {
    let provisioner = Arc::new(Provisioner::new(
        Arc::new(StubSchemas),
        Arc::new(StubMigrator),
        Arc::new(StubBuckets),
        Arc::new(StubSeeder),
        registry.clone(),
        Arc::new(NoopAudit),
    ));
    let state = AppState::new(provisioner, registry, Arc::new(test_config()));
    TestServer::new(build_router(state))
        .map_err(|err| anyhow::anyhow!(err.to_string()))
}

#[tokio::test]
async fn root_domain_request_bypasses_gate_without_registry_lookup() -> Result<()> {
    let registry = Arc::new(FakeRegistry::default());
    let server = build_server(registry.clone())?;

    let response = server
        .get("/health")
        .add_header("Host", "shops.example")
        .await;
    response.assert_status_ok();
    assert_eq!(registry.lookup_count(), 0);

    // Reserved names carry no tenant identity either.
    let response = server
        .get("/health")
        .add_header("Host", "www.shops.example")
        .await;
    response.assert_status_ok();
    assert_eq!(registry.lookup_count(), 0);

    Ok(())
}

#[tokio::test]
async fn unknown_subdomain_is_rejected() -> Result<()> {
    let registry = Arc::new(FakeRegistry::default());
    let server = build_server(registry.clone())?;

    let response = server
        .get("/tenant")
        .add_header("Host", "ghost.shops.example")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Unknown tenant");
    assert_eq!(registry.lookup_count(), 1);

    Ok(())
}

#[tokio::test]
async fn suspended_tenant_is_rejected_with_distinct_message() -> Result<()> {
    let registry = Arc::new(FakeRegistry::with_tenant(
        "coffee-beans",
        TenantStatus::Suspended,
    ));
    let server = build_server(registry)?;

    let response = server
        .get("/tenant")
        .add_header("Host", "coffee-beans.shops.example")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Tenant account is suspended");

    Ok(())
}

#[tokio::test]
async fn active_tenant_request_runs_under_its_context() -> Result<()> {
    let registry = Arc::new(FakeRegistry::with_tenant(
        "coffee-beans",
        TenantStatus::Active,
    ));
    let server = build_server(registry)?;

    let response = server
        .get("/tenant")
        .add_header("Host", "coffee-beans.shops.example:4000")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["subdomain"], "coffee-beans");
    assert_eq!(body["data"]["plan"], "basic");
    assert!(
        body["data"]["features"]
            .as_array()
            .is_some_and(|f| f.iter().any(|v| v == "custom_domain"))
    );

    Ok(())
}

#[tokio::test]
async fn tenant_endpoint_requires_context() -> Result<()> {
    let registry = Arc::new(FakeRegistry::default());
    let server = build_server(registry)?;

    // Root-domain request reaches the handler without a tenant context.
    let response = server
        .get("/tenant")
        .add_header("Host", "shops.example")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Tenant context required");

    Ok(())
}

#[tokio::test]
async fn provision_endpoint_returns_receipt() -> Result<()> {
    let registry = Arc::new(FakeRegistry::default());
    let server = build_server(registry.clone())?;

    let response = server
        .post("/provision")
        .add_header("Host", "shops.example")
        .json(&serde_json::json!({
            "subdomain": "Coffee-Beans",
            "storeName": "Coffee Beans Ltd",
            "adminEmail": "owner@coffee.example",
            "plan": "basic"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["data"]["subdomain"], "coffee-beans");
    assert_eq!(
        body["data"]["activationUrl"],
        "https://coffee-beans.shops.example/"
    );
    assert_eq!(body["data"]["temporaryPassword"], "temp-credential");

    // The registration landed, so the new tenant now resolves at the gate.
    let response = server
        .get("/tenant")
        .add_header("Host", "coffee-beans.shops.example")
        .await;
    response.assert_status_ok();

    Ok(())
}

#[tokio::test]
async fn provision_rejects_invalid_subdomain() -> Result<()> {
    let registry = Arc::new(FakeRegistry::default());
    let server = build_server(registry)?;

    let response = server
        .post("/provision")
        .add_header("Host", "shops.example")
        .json(&serde_json::json!({
            "subdomain": "ab",
            "storeName": "Too Short",
            "adminEmail": "owner@short.example",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn repeat_provision_inside_dedup_window_maps_to_409() -> Result<()> {
    let registry = Arc::new(FakeRegistry::default());
    let server = build_server(registry)?;

    let body = serde_json::json!({
        "subdomain": "coffee-beans",
        "storeName": "Coffee Beans Ltd",
        "adminEmail": "owner@coffee.example",
    });

    let first = server
        .post("/provision")
        .add_header("Host", "shops.example")
        .json(&body)
        .await;
    first.assert_status(StatusCode::CREATED);

    let second = server
        .post("/provision")
        .add_header("Host", "shops.example")
        .json(&body)
        .await;
    second.assert_status(StatusCode::CONFLICT);

    let body: Value = second.json();
    assert_eq!(body["error"]["message"], "Subdomain is already taken");

    Ok(())
}
