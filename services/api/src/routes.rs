//! API service routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthClientError,
    error::ApiError,
    models::{
        building::{CreateBuildingRequest, UpdateBuildingRequest},
        goal::{CreateGoalRequest, UpdateGoalRequest},
        profile::{CreateProfileRequest, UpdateProfileRequest},
    },
    validation::validate_username,
};

/// Request for user signup and login pass-through
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/profiles", post(create_profile).get(get_profiles))
        .route(
            "/profiles/:id",
            get(get_profile).patch(update_profile).delete(delete_profile),
        )
        .route("/goals", post(create_goal))
        .route("/goals/user/:user_id", get(get_user_goals))
        .route(
            "/goals/:id",
            get(get_goal).patch(update_goal).delete(delete_goal),
        )
        .route("/goals/:id/checkin", post(check_in_goal))
        .route("/buildings", post(create_building))
        .route("/buildings/user/:user_id", get(get_user_buildings))
        .route(
            "/buildings/:id",
            get(get_building)
                .patch(update_building)
                .delete(delete_building),
        )
        .route("/users", post(create_user).get(get_users))
        .route("/users/:id", delete(delete_user))
        .route("/auth/login", post(login))
        // The game front-end is served from another origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

// --- Profiles ---

/// Create a new profile
pub async fn create_profile(
    State(state): State<AppState>,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_username(&payload.username).map_err(ApiError::BadRequest)?;

    let profile = state
        .profile_repository
        .create(&payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create profile: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Get all profiles
pub async fn get_profiles(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let profiles = state.profile_repository.get_all().await.map_err(|e| {
        tracing::error!("Failed to get profiles: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(profiles))
}

/// Get a profile by ID
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .profile_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get profile: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

/// Update a profile by ID
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(username) = &payload.username {
        validate_username(username).map_err(ApiError::BadRequest)?;
    }

    let profile = state
        .profile_repository
        .update(id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update profile: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

/// Delete a profile by ID
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.profile_repository.delete(id).await.map_err(|e| {
        tracing::error!("Failed to delete profile: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(StatusCode::NO_CONTENT)
}

// --- Goals ---

/// Create a new goal
pub async fn create_goal(
    State(state): State<AppState>,
    Json(payload): Json<CreateGoalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Missing required fields: user_id and name".to_string(),
        ));
    }

    let goal = state.goal_repository.create(&payload).await.map_err(|e| {
        tracing::error!("Failed to create goal: {}", e);
        ApiError::InternalServerError
    })?;

    Ok((StatusCode::CREATED, Json(goal)))
}

/// Get all goals for a specific user
pub async fn get_user_goals(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let goals = state
        .goal_repository
        .get_by_user(user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get goals: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(goals))
}

/// Get a goal by ID
pub async fn get_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let goal = state
        .goal_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get goal: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Goal not found".to_string()))?;

    Ok(Json(goal))
}

/// Update a goal by ID
pub async fn update_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGoalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let goal = state
        .goal_repository
        .update(id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update goal: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Goal not found".to_string()))?;

    Ok(Json(goal))
}

/// Record the daily check-in on a goal
pub async fn check_in_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let goal = state
        .goal_repository
        .check_in(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check in goal: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Goal not found".to_string()))?;

    Ok(Json(goal))
}

/// Delete a goal by ID
pub async fn delete_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.goal_repository.delete(id).await.map_err(|e| {
        tracing::error!("Failed to delete goal: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(StatusCode::NO_CONTENT)
}

// --- Buildings ---

/// Place a new building
pub async fn create_building(
    State(state): State<AppState>,
    Json(payload): Json<CreateBuildingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Missing required fields: user_id and name".to_string(),
        ));
    }

    let building = state
        .building_repository
        .create(&payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create building: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(building)))
}

/// Get all buildings for a specific user
pub async fn get_user_buildings(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let buildings = state
        .building_repository
        .get_by_user(user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get buildings: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(buildings))
}

/// Get a building by ID
pub async fn get_building(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let building = state
        .building_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get building: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Building not found".to_string()))?;

    Ok(Json(building))
}

/// Update a building by ID
pub async fn update_building(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBuildingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let building = state
        .building_repository
        .update(id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update building: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Building not found".to_string()))?;

    Ok(Json(building))
}

/// Delete a building by ID
pub async fn delete_building(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.building_repository.delete(id).await.map_err(|e| {
        tracing::error!("Failed to delete building: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(StatusCode::NO_CONTENT)
}

// --- Users (pass-through to the auth provider) ---

/// Create a user at the auth provider
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required.".to_string(),
        ));
    }

    let user = state
        .auth_client
        .create_user(&payload.email, &payload.password)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create user: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users at the auth provider
pub async fn get_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.auth_client.list_users().await.map_err(|e| {
        tracing::error!("Failed to list users: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(users))
}

/// Delete a user at the auth provider
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth_client.delete_user(&id).await.map_err(|e| {
        tracing::error!("Failed to delete user: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(json!({
        "message": "User deleted successfully.",
        "user": user,
    })))
}

/// Sign a user in through the auth provider
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required.".to_string(),
        ));
    }

    let session = state
        .auth_client
        .sign_in(&payload.email, &payload.password)
        .await
        .map_err(|e| match e {
            AuthClientError::InvalidCredentials => ApiError::Unauthorized,
            other => {
                tracing::error!("Failed to sign user in: {}", other);
                ApiError::InternalServerError
            }
        })?;

    Ok(Json(session))
}
