//! Goal repository for database operations

use anyhow::Result;
use uuid::Uuid;

use super::{CrudRepository, OwnedEntity, TableEntity};
use crate::models::goal::{CreateGoalRequest, Goal, GoalKind, UpdateGoalRequest};

impl TableEntity for Goal {
    const TABLE: &'static str = "goals";
    const COLUMNS: &'static str = "id, user_id, name, description, target_date, is_completed, \
                                   accountability, kind, created_at, updated_at";
}

impl OwnedEntity for Goal {}

/// Goal repository
pub type GoalRepository = CrudRepository<Goal>;

impl CrudRepository<Goal> {
    /// Create a new goal
    pub async fn create(&self, payload: &CreateGoalRequest) -> Result<Goal> {
        let goal = sqlx::query_as::<_, Goal>(
            r#"
            INSERT INTO goals (user_id, name, description, target_date, is_completed, kind)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, description, target_date, is_completed,
                      accountability, kind, created_at, updated_at
            "#,
        )
        .bind(payload.user_id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.target_date)
        .bind(payload.is_completed.unwrap_or(false))
        .bind(payload.kind.unwrap_or(GoalKind::Habit))
        .fetch_one(self.pool())
        .await?;

        Ok(goal)
    }

    /// Apply a partial update and return the updated goal, if it exists
    pub async fn update(&self, id: Uuid, payload: &UpdateGoalRequest) -> Result<Option<Goal>> {
        let goal = sqlx::query_as::<_, Goal>(
            r#"
            UPDATE goals
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                target_date = COALESCE($4, target_date),
                is_completed = COALESCE($5, is_completed),
                kind = COALESCE($6, kind),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, name, description, target_date, is_completed,
                      accountability, kind, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.target_date)
        .bind(payload.is_completed)
        .bind(payload.kind)
        .fetch_optional(self.pool())
        .await?;

        Ok(goal)
    }

    /// Record the user's daily check-in on a goal
    ///
    /// The flag stays set until the nightly accountability reset.
    pub async fn check_in(&self, id: Uuid) -> Result<Option<Goal>> {
        let goal = sqlx::query_as::<_, Goal>(
            r#"
            UPDATE goals
            SET accountability = TRUE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, name, description, target_date, is_completed,
                      accountability, kind, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(goal)
    }
}
