use anyhow::Result;
use std::env;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod auth;
mod error;
mod models;
mod repositories;
mod routes;
mod state;
mod validation;

use common::database::{DatabaseConfig, init_pool};

use crate::{
    auth::{AuthClient, AuthConfig},
    repositories::{BuildingRepository, GoalRepository, ProfileRepository},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize the auth provider client
    let auth_config = AuthConfig::from_env()?;
    let auth_client = AuthClient::new(auth_config);

    info!("API service initialized successfully");

    // Initialize repositories
    let profile_repository = ProfileRepository::new(pool.clone());
    let goal_repository = GoalRepository::new(pool.clone());
    let building_repository = BuildingRepository::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        profile_repository,
        goal_repository,
        building_repository,
        auth_client,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("API service listening on 0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
