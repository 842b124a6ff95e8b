//! Profile repository for database operations

use anyhow::Result;
use uuid::Uuid;

use super::{CrudRepository, TableEntity};
use crate::models::profile::{CreateProfileRequest, Profile, UpdateProfileRequest};

impl TableEntity for Profile {
    const TABLE: &'static str = "profiles";
    const COLUMNS: &'static str = "id, username, points, created_at, updated_at";
}

/// Profile repository
pub type ProfileRepository = CrudRepository<Profile>;

impl CrudRepository<Profile> {
    /// Create a new profile
    pub async fn create(&self, payload: &CreateProfileRequest) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, username, points)
            VALUES ($1, $2, $3)
            RETURNING id, username, points, created_at, updated_at
            "#,
        )
        .bind(payload.id)
        .bind(&payload.username)
        .bind(payload.points.unwrap_or(0))
        .fetch_one(self.pool())
        .await?;

        Ok(profile)
    }

    /// Apply a partial update and return the updated profile, if it exists
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateProfileRequest,
    ) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET username = COALESCE($2, username),
                points = COALESCE($3, points),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, points, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.username)
        .bind(payload.points)
        .fetch_optional(self.pool())
        .await?;

        Ok(profile)
    }
}
