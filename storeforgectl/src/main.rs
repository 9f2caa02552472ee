//! Operator CLI for the Storeforge platform.
//!
//! `storeforgectl provision` drives the same orchestrator the server uses,
//! wired straight at `DATABASE_URL` and `STORAGE_ROOT`. Intended for
//! migrations, support tooling and local development.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storeforge_core::{
    BucketManager, FsObjectStore, MigrationRunner, PostgresTenantRegistry,
    ProvisionRequest, Provisioner, SchemaManager, Seeder, TracingAuditSink,
    connect_pool, ensure_registry,
};
use storeforge_model::Plan;

#[derive(Parser, Debug)]
#[command(name = "storeforgectl")]
#[command(about = "Storeforge operator CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Provision a complete tenant environment
    Provision(ProvisionArgs),
}

#[derive(clap::Args, Debug)]
struct ProvisionArgs {
    /// Tenant subdomain, e.g. coffee-beans
    #[arg(long)]
    subdomain: String,

    /// Administrator email address
    #[arg(long)]
    email: String,

    /// Administrator password
    #[arg(long)]
    password: String,

    /// Display name of the store
    #[arg(long)]
    store_name: String,

    /// Subscription plan: free, basic, pro or enterprise
    #[arg(long, default_value = "free")]
    plan: String,

    /// Print only the subdomain on success
    #[arg(long)]
    quiet: bool,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Root directory of the asset object store
    #[arg(long, env = "STORAGE_ROOT", default_value = "./storage")]
    storage_root: PathBuf,

    /// Region label recorded on created buckets
    #[arg(long, env = "STORAGE_REGION", default_value = "local")]
    storage_region: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storeforgectl=warn,storeforge=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Provision(args) => provision(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("storeforgectl: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn provision(args: ProvisionArgs) -> Result<()> {
    let plan: Plan = args
        .plan
        .parse()
        .with_context(|| format!("invalid plan {:?}", args.plan))?;

    let pool = connect_pool(&args.database_url, 5)
        .await
        .context("failed to connect to PostgreSQL")?;
    ensure_registry(&pool)
        .await
        .context("failed to prepare tenant registry")?;

    let store = Arc::new(FsObjectStore::new(args.storage_root));
    let provisioner = Provisioner::new(
        Arc::new(SchemaManager::new(pool.clone())),
        Arc::new(MigrationRunner::new(pool.clone())),
        Arc::new(BucketManager::new(store, args.storage_region)),
        Arc::new(Seeder::new(pool.clone())),
        Arc::new(PostgresTenantRegistry::new(pool)),
        Arc::new(TracingAuditSink),
    );

    let receipt = provisioner
        .provision(&ProvisionRequest {
            subdomain: args.subdomain,
            store_name: args.store_name,
            admin_email: args.email,
            admin_password: Some(args.password),
            plan,
        })
        .await
        .context("provisioning failed")?;

    if args.quiet {
        println!("{}", receipt.subdomain);
    } else {
        println!(
            "provisioned {} (schema {}, bucket {}, admin {}) in {}ms",
            receipt.subdomain,
            receipt.schema_name,
            receipt.bucket_name,
            receipt.admin_id,
            receipt.duration.as_millis()
        );
    }

    Ok(())
}
