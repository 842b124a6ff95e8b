//! Profile model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Profile entity
///
/// One row per auth identity; `id` mirrors the auth provider's user id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfileRequest {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub points: Option<i32>,
}

/// Profile update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub points: Option<i32>,
}
