//! Building model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Building state within the player's base.
///
/// The nightly accountability batch moves buildings to `Destroyed`;
/// anything not destroyed counts as a destruction candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "building_status", rename_all = "lowercase")]
pub enum BuildingStatus {
    Active,
    Damaged,
    Destroyed,
}

/// Building entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Building {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub status: BuildingStatus,
    pub grid_x: i32,
    pub grid_y: i32,
    pub cost: i32,
    pub level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Building creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBuildingRequest {
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub status: Option<BuildingStatus>,
    #[serde(default)]
    pub grid_x: Option<i32>,
    #[serde(default)]
    pub grid_y: Option<i32>,
    #[serde(default)]
    pub cost: Option<i32>,
    #[serde(default)]
    pub level: Option<i32>,
}

/// Building update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateBuildingRequest {
    pub name: Option<String>,
    pub status: Option<BuildingStatus>,
    pub grid_x: Option<i32>,
    pub grid_y: Option<i32>,
    pub cost: Option<i32>,
    pub level: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_status_round_trips_through_json() {
        let status: BuildingStatus = serde_json::from_str("\"destroyed\"").unwrap();
        assert_eq!(status, BuildingStatus::Destroyed);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"destroyed\"");
    }
}
