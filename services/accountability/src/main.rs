use anyhow::Result;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

mod batch;
mod config;
mod store;

use batch::AccountabilityBatch;
use common::database::{DatabaseConfig, init_pool};
use config::BatchSettings;
use store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .init();

    info!("Starting accountability service");

    let settings = BatchSettings::load()?;

    // Initialize database connection
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if !common::database::health_check(&pool).await? {
        anyhow::bail!("Failed to connect to database");
    }

    let store = Arc::new(PgStore::new(pool));
    let batch = AccountabilityBatch::new(store);

    // Start the nightly schedule
    let _scheduler = batch.start_schedule(&settings).await?;

    info!("Accountability service started successfully");

    // Keep the service running
    tokio::signal::ctrl_c().await?;
    info!("Shutting down accountability service");

    Ok(())
}
