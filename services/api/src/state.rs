//! Application state shared across handlers

use sqlx::PgPool;

use crate::auth::AuthClient;
use crate::repositories::{BuildingRepository, GoalRepository, ProfileRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub profile_repository: ProfileRepository,
    pub goal_repository: GoalRepository,
    pub building_repository: BuildingRepository,
    pub auth_client: AuthClient,
}
