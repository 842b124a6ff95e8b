//! Storage contract consumed by the nightly batch
//!
//! The batch only needs a handful of query shapes: distinct goal owners, a
//! failed-goal count per user, a bounded destroy pass over a user's
//! buildings, a global check-in reset, and due-goal completion. They are
//! expressed as a trait so the jobs run against an injected handle rather
//! than a module-level client.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

/// Queries the accountability jobs run against the database
#[async_trait]
pub trait AccountabilityStore: Send + Sync {
    /// Distinct user ids present in the goals table
    async fn goal_owner_ids(&self) -> Result<Vec<Uuid>>;

    /// Number of goals for a user that are neither completed nor checked in
    async fn unmet_goal_count(&self, user_id: Uuid) -> Result<i64>;

    /// Mark up to `limit` of the user's non-destroyed buildings destroyed,
    /// oldest first, and return the ids that changed
    async fn destroy_buildings(&self, user_id: Uuid, limit: i64) -> Result<Vec<Uuid>>;

    /// Clear the check-in flag on every goal; returns how many were set
    async fn clear_checkins(&self) -> Result<u64>;

    /// Complete every unfinished goal whose target date is `today`; returns
    /// how many were completed
    async fn complete_due_goals(&self, today: NaiveDate) -> Result<u64>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new PostgreSQL-backed store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountabilityStore for PgStore {
    async fn goal_owner_ids(&self) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT DISTINCT user_id FROM goals")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn unmet_goal_count(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM goals
            WHERE user_id = $1
              AND is_completed = FALSE
              AND accountability = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn destroy_buildings(&self, user_id: Uuid, limit: i64) -> Result<Vec<Uuid>> {
        // Single statement, so nothing can change a building between
        // selection and update. Oldest buildings fall first.
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE buildings
            SET status = 'destroyed', updated_at = NOW()
            WHERE id IN (
                SELECT id
                FROM buildings
                WHERE user_id = $1 AND status <> 'destroyed'
                ORDER BY created_at, id
                LIMIT $2
            )
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn clear_checkins(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE goals
            SET accountability = FALSE, updated_at = NOW()
            WHERE accountability = TRUE
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn complete_due_goals(&self, today: NaiveDate) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE goals
            SET is_completed = TRUE, updated_at = NOW()
            WHERE target_date = $1 AND is_completed = FALSE
            "#,
        )
        .bind(today)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
