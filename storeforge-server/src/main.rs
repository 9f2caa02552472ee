//! # Storeforge Server
//!
//! Multi-tenant provisioning server.
//!
//! ## Overview
//!
//! Storeforge provisions isolated per-tenant environments for a
//! multi-tenant store platform:
//!
//! - **Provisioning Saga**: schema, migrations, asset bucket and seed data
//!   created all-or-nothing, with reverse compensation on failure
//! - **Tenant Isolation**: every tenant-facing request passes the isolation
//!   gate, which installs an immutable per-request tenant context
//! - **Deterministic Naming**: one pure mapping from subdomain to schema
//!   and bucket names, shared by create and destroy paths
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - PostgreSQL for the tenant registry and per-tenant schemas
//! - A filesystem-backed object store for tenant asset buckets

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storeforge_core::{
    BucketManager, FsObjectStore, MigrationRunner, PostgresTenantRegistry,
    Provisioner, SchemaManager, Seeder, TracingAuditSink, connect_pool,
    ensure_registry,
};
use storeforge_server::{AppState, Config, build_router};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "storeforge-server")]
#[command(about = "Multi-tenant provisioning server for the Storeforge platform")]
struct Cli {
    /// Path to TOML configuration (overrides STOREFORGE_CONFIG)
    #[arg(long, env = "STOREFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storeforge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let pool = connect_pool(&config.database_url, config.max_connections)
        .await
        .context("failed to connect to PostgreSQL")?;
    ensure_registry(&pool)
        .await
        .context("failed to prepare tenant registry")?;

    let store = Arc::new(FsObjectStore::new(config.storage_root.clone()));
    let registry = Arc::new(PostgresTenantRegistry::new(pool.clone()));
    let provisioner = Arc::new(Provisioner::new(
        Arc::new(SchemaManager::new(pool.clone())),
        Arc::new(MigrationRunner::new(pool.clone())),
        Arc::new(BucketManager::new(store, config.storage_region.clone())),
        Arc::new(Seeder::new(pool)),
        registry.clone(),
        Arc::new(TracingAuditSink),
    ));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid server address")?;
    let state = AppState::new(provisioner, registry, Arc::new(config));
    let router = build_router(state);

    info!(%addr, "storeforge server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
