//! Building repository for database operations

use anyhow::Result;
use uuid::Uuid;

use super::{CrudRepository, OwnedEntity, TableEntity};
use crate::models::building::{
    Building, BuildingStatus, CreateBuildingRequest, UpdateBuildingRequest,
};

impl TableEntity for Building {
    const TABLE: &'static str = "buildings";
    const COLUMNS: &'static str = "id, user_id, name, status, grid_x, grid_y, cost, level, \
                                   created_at, updated_at";
    // The base renders in placement order.
    const ORDER_BY: &'static str = "created_at";
}

impl OwnedEntity for Building {}

/// Building repository
pub type BuildingRepository = CrudRepository<Building>;

impl CrudRepository<Building> {
    /// Place a new building
    pub async fn create(&self, payload: &CreateBuildingRequest) -> Result<Building> {
        let building = sqlx::query_as::<_, Building>(
            r#"
            INSERT INTO buildings (user_id, name, status, grid_x, grid_y, cost, level)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, status, grid_x, grid_y, cost, level,
                      created_at, updated_at
            "#,
        )
        .bind(payload.user_id)
        .bind(&payload.name)
        .bind(payload.status.unwrap_or(BuildingStatus::Active))
        .bind(payload.grid_x.unwrap_or(0))
        .bind(payload.grid_y.unwrap_or(0))
        .bind(payload.cost.unwrap_or(0))
        .bind(payload.level.unwrap_or(1))
        .fetch_one(self.pool())
        .await?;

        Ok(building)
    }

    /// Apply a partial update and return the updated building, if it exists
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateBuildingRequest,
    ) -> Result<Option<Building>> {
        let building = sqlx::query_as::<_, Building>(
            r#"
            UPDATE buildings
            SET name = COALESCE($2, name),
                status = COALESCE($3, status),
                grid_x = COALESCE($4, grid_x),
                grid_y = COALESCE($5, grid_y),
                cost = COALESCE($6, cost),
                level = COALESCE($7, level),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, name, status, grid_x, grid_y, cost, level,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(payload.status)
        .bind(payload.grid_x)
        .bind(payload.grid_y)
        .bind(payload.cost)
        .bind(payload.level)
        .fetch_optional(self.pool())
        .await?;

        Ok(building)
    }
}
