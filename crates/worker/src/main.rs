//! Worker entry point: wires the PostgreSQL store, the remote provider
//! client, and the notifier into a scheduler and runs it until a
//! shutdown signal arrives.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use meshgen_db::PgJobStore;
use meshgen_dispatch::{Scheduler, SchedulerConfig};
use meshgen_events::Notifier;
use meshgen_provider::{client::DEFAULT_BASE_URL, HttpProvider};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("meshgen_worker=debug,meshgen_dispatch=debug,meshgen_db=info")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = meshgen_db::create_pool(&database_url)
        .await
        .context("failed to connect to database")?;
    meshgen_db::health_check(&pool)
        .await
        .context("database health check failed")?;
    meshgen_db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("Database ready");

    let provider_url =
        std::env::var("PROVIDER_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let config = SchedulerConfig {
        assets_dir: std::env::var("ASSETS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("assets")),
        public_base_url: std::env::var("BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        ..SchedulerConfig::default()
    };

    let store = Arc::new(PgJobStore::new(pool));
    let provider = Arc::new(HttpProvider::new(provider_url));
    let notifier = Arc::new(Notifier::default());
    let scheduler = Scheduler::new(store, provider, notifier, config);

    let run_handle = tokio::spawn(Arc::clone(&scheduler).run());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");
    scheduler.shutdown();
    run_handle.await.context("scheduler task panicked")?;

    Ok(())
}
