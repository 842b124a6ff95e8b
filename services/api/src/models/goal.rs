//! Goal model and related payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What a goal works toward: breaking an addiction or building a habit.
///
/// Stored as a SMALLINT (0 = addiction, 1 = habit), serialized as a
/// lowercase string on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum GoalKind {
    Addiction = 0,
    Habit = 1,
}

/// Goal entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub is_completed: bool,
    /// True only between the user's check-in and the nightly reset.
    pub accountability: bool,
    pub kind: GoalKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Goal creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGoalRequest {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub kind: Option<GoalKind>,
}

/// Goal update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateGoalRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub is_completed: Option<bool>,
    pub kind: Option<GoalKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_kind_serializes_as_lowercase_string() {
        assert_eq!(
            serde_json::to_string(&GoalKind::Addiction).unwrap(),
            "\"addiction\""
        );
        assert_eq!(serde_json::to_string(&GoalKind::Habit).unwrap(), "\"habit\"");
    }

    #[test]
    fn goal_kind_deserializes_from_lowercase_string() {
        let kind: GoalKind = serde_json::from_str("\"habit\"").unwrap();
        assert_eq!(kind, GoalKind::Habit);
        assert!(serde_json::from_str::<GoalKind>("\"other\"").is_err());
    }
}
