//! Provisioning orchestrator: drives the schema → migrations → bucket →
//! seed sequence, registers the tenant, and compensates in reverse on
//! failure.
//!
//! Steps are strictly sequential; each awaits fully before the next starts.
//! There is no mid-step cancellation: callers that need a timeout should
//! spawn the job and time out the join, so a still-running attempt finishes
//! its compensation instead of racing a retry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{error, info, warn};

use storeforge_model::{
    TenantContext, TenantId, TenantRecord, TenantStatus, naming,
};

use crate::context;
use crate::error::{ProvisionError, Result};
use crate::ports::{
    AuditSink, BucketLifecycle, SchemaLifecycle, SchemaMigrator, TenantRegistry,
    TenantSeeder,
};
use crate::saga::{Compensation, SagaLog};
use crate::types::{
    AuditEvent, ProvisionReceipt, ProvisionRequest, SeedOutcome, SeedRequest,
};

pub const STEP_CREATE_SCHEMA: &str = "create-schema";
pub const STEP_RUN_MIGRATIONS: &str = "run-migrations";
pub const STEP_CREATE_BUCKET: &str = "create-bucket";
pub const STEP_SEED_DATA: &str = "seed-data";

const PROVISION_STEPS: &[&str] = &[
    STEP_CREATE_SCHEMA,
    STEP_RUN_MIGRATIONS,
    STEP_CREATE_BUCKET,
    STEP_SEED_DATA,
];

/// Repeat submissions for a just-provisioned subdomain are rejected inside
/// this window, absorbing double-click and retry storms.
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(60);

pub struct Provisioner {
    schemas: Arc<dyn SchemaLifecycle>,
    migrator: Arc<dyn SchemaMigrator>,
    buckets: Arc<dyn BucketLifecycle>,
    seeder: Arc<dyn TenantSeeder>,
    registry: Arc<dyn TenantRegistry>,
    audit: Arc<dyn AuditSink>,
    in_flight: DashMap<String, Instant>,
    completed_at: DashMap<String, Instant>,
    dedup_window: Duration,
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner")
            .field("in_flight", &self.in_flight.len())
            .field("dedup_window", &self.dedup_window)
            .finish_non_exhaustive()
    }
}

impl Provisioner {
    pub fn new(
        schemas: Arc<dyn SchemaLifecycle>,
        migrator: Arc<dyn SchemaMigrator>,
        buckets: Arc<dyn BucketLifecycle>,
        seeder: Arc<dyn TenantSeeder>,
        registry: Arc<dyn TenantRegistry>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            schemas,
            migrator,
            buckets,
            seeder,
            registry,
            audit,
            in_flight: DashMap::new(),
            completed_at: DashMap::new(),
            dedup_window: DEFAULT_DEDUP_WINDOW,
        }
    }

    pub fn with_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    /// Provisions one tenant end to end, all-or-nothing from the caller's
    /// perspective.
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisionReceipt> {
        // Validation rejects before any resource is touched or reserved.
        let subdomain = naming::sanitize_subdomain(&request.subdomain)?;
        let schema_name = naming::schema_name(&subdomain)?;
        let bucket_name = naming::bucket_name(&subdomain)?;

        self.reserve(&subdomain)?;
        let outcome = self
            .run_job(&subdomain, &schema_name, &bucket_name, request)
            .await;
        self.release(&subdomain, outcome.is_ok());

        outcome.map_err(Self::classify)
    }

    async fn run_job(
        &self,
        subdomain: &str,
        schema_name: &str,
        bucket_name: &str,
        request: &ProvisionRequest,
    ) -> Result<ProvisionReceipt> {
        let started = Instant::now();
        let tenant_id = TenantId::new();
        let mut log = SagaLog::new(subdomain, PROVISION_STEPS);

        // Internal calls run under the tenant's own context; the tenant is
        // not active until the registration write.
        let ctx = TenantContext::new(
            tenant_id,
            subdomain,
            schema_name,
            request.plan,
            false,
        );

        let result = context::with_context(
            ctx,
            self.run_steps(&mut log, tenant_id, subdomain, request),
        )
        .await;

        match result {
            Ok(seed) => {
                info!(
                    subdomain = %subdomain,
                    tenant_id = %tenant_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "tenant provisioned"
                );
                Ok(ProvisionReceipt {
                    tenant_id,
                    subdomain: subdomain.to_string(),
                    schema_name: schema_name.to_string(),
                    bucket_name: bucket_name.to_string(),
                    admin_id: seed.admin_id,
                    generated_password: seed.generated_password,
                    duration: started.elapsed(),
                })
            }
            Err(err) => {
                error!(
                    subdomain = %subdomain,
                    error = %err,
                    "provisioning failed, compensating completed steps"
                );
                self.compensate(&log).await;
                Err(err)
            }
        }
    }

    async fn run_steps(
        &self,
        log: &mut SagaLog,
        tenant_id: TenantId,
        subdomain: &str,
        request: &ProvisionRequest,
    ) -> Result<SeedOutcome> {
        record_step(
            log,
            STEP_CREATE_SCHEMA,
            Some(Compensation::DropSchema),
            self.schemas.create(subdomain).await,
        )?;

        record_step(
            log,
            STEP_RUN_MIGRATIONS,
            // The schema drop transitively removes migrated tables.
            None,
            self.migrator.run(subdomain).await,
        )?;

        record_step(
            log,
            STEP_CREATE_BUCKET,
            Some(Compensation::DeleteBucket),
            self.buckets.create(subdomain, request.plan).await,
        )?;

        let seed = record_step(
            log,
            STEP_SEED_DATA,
            None,
            self.seeder
                .seed(&SeedRequest {
                    subdomain: subdomain.to_string(),
                    admin_email: request.admin_email.clone(),
                    admin_password: request.admin_password.clone(),
                    store_name: request.store_name.clone(),
                })
                .await,
        )?;

        // Cross-tenant registration write: not a compensated step, runs only
        // after every step above succeeded, and makes the tenant visible.
        let record = TenantRecord {
            id: tenant_id,
            subdomain: subdomain.to_string(),
            display_name: request.store_name.clone(),
            plan: request.plan,
            status: TenantStatus::Active,
            created_at: Utc::now(),
        };
        self.registry.insert(&record).await?;

        self.audit.log(AuditEvent::provisioning_completed(
            subdomain,
            tenant_id,
            serde_json::json!({
                "plan": request.plan.as_str(),
                "adminEmail": request.admin_email,
            }),
        ));

        Ok(seed)
    }

    /// Walks completed steps in reverse, invoking compensating actions.
    /// Compensation errors are logged and collected, never surfaced: the
    /// original failure always wins.
    async fn compensate(&self, log: &SagaLog) {
        for compensation in log.compensations() {
            let outcome = match compensation {
                Compensation::DeleteBucket => self
                    .buckets
                    .delete(log.subdomain(), true)
                    .await
                    .map(|_| ()),
                Compensation::DropSchema => self
                    .schemas
                    .drop_schema(log.subdomain(), false)
                    .await
                    .map(|_| ()),
            };

            match outcome {
                Ok(()) => info!(
                    subdomain = %log.subdomain(),
                    action = ?compensation,
                    "compensation applied"
                ),
                Err(e) => warn!(
                    subdomain = %log.subdomain(),
                    action = ?compensation,
                    error = %e,
                    "compensation failed"
                ),
            }
        }
    }

    fn reserve(&self, subdomain: &str) -> Result<()> {
        // The guard ref must drop before the remove below; holding it across
        // a same-key remove would deadlock the shard.
        let expired = match self.completed_at.get(subdomain) {
            Some(done) if done.elapsed() < self.dedup_window => {
                return Err(ProvisionError::AlreadyExists(format!(
                    "tenant {subdomain} was just provisioned"
                )));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.completed_at.remove(subdomain);
        }

        match self.in_flight.entry(subdomain.to_string()) {
            Entry::Occupied(_) => Err(ProvisionError::AlreadyExists(format!(
                "provisioning for {subdomain} is already in flight"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                Ok(())
            }
        }
    }

    fn release(&self, subdomain: &str, completed: bool) {
        self.in_flight.remove(subdomain);
        if completed {
            // Sweep expired markers on insert so the map stays bounded by
            // the number of completions inside one window.
            let window = self.dedup_window;
            self.completed_at.retain(|_, done| done.elapsed() < window);
            self.completed_at
                .insert(subdomain.to_string(), Instant::now());
        }
    }

    /// Error classification at the orchestrator boundary: pre-existing
    /// resources surface as conflicts, validation passes through, anything
    /// else becomes `Failed` carrying the original message.
    fn classify(err: ProvisionError) -> ProvisionError {
        match err {
            e @ (ProvisionError::AlreadyExists(_)
            | ProvisionError::Validation(_)) => e,
            other => ProvisionError::Failed(other.to_string()),
        }
    }
}

fn record_step<T>(
    log: &mut SagaLog,
    name: &'static str,
    compensation: Option<Compensation>,
    result: Result<T>,
) -> Result<T> {
    match result {
        Ok(value) => {
            log.complete(name, compensation);
            Ok(value)
        }
        Err(err) => {
            log.fail(name);
            Err(err)
        }
    }
}
