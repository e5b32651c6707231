//! User CRUD request handlers.
//!
//! Every handler logs exactly one event describing its outcome. Rejections
//! raised by the extractors are logged there instead.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use tracing::{debug, error, info, warn};

use crate::api::dto::{UserPayload, UserResponse};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::{UserId, ValidatedJson};

/// Routes, each also served with a trailing slash:
/// - GET /users         - List all users
/// - POST /users        - Create a new user
/// - GET /users/{id}    - Get user by ID
/// - PUT /users/{id}    - Update user by ID
/// - DELETE /users/{id} - Delete user by ID
pub fn user_routes() -> Router<AppState> {
    let collection = get(list_users).post(create_user);
    let member = get(get_user).put(update_user).delete(delete_user);

    Router::new()
        .route("/users", collection.clone())
        .route("/users/", collection)
        .route("/users/{id}", member.clone())
        .route("/users/{id}/", member)
}

/// Second-stage date conversion after field validation.
fn split_payload(payload: UserPayload) -> AppResult<(String, jiff::civil::Date)> {
    payload.into_parts().inspect_err(|err| {
        warn!(error = %err, "Request validation failed");
    })
}

/// POST /users
async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UserPayload>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let (name, dob) = split_payload(payload)?;

    match state.services.users.create(&name, dob).await {
        Ok(user) => {
            info!(user_id = user.id, user_name = %user.name, "User created");
            Ok((StatusCode::CREATED, Json(user)))
        }
        Err(err) => {
            error!(user_name = %name, error = %err, "Failed to create user");
            Err(err)
        }
    }
}

/// GET /users/{id}
async fn get_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> AppResult<Json<UserResponse>> {
    match state.services.users.get(id).await {
        Ok(Some(user)) => {
            info!(user_id = id, user_name = %user.name, "User fetched");
            Ok(Json(user))
        }
        Ok(None) => {
            debug!(user_id = id, "User not found");
            Err(AppError::not_found("User", "id", id))
        }
        Err(err) => {
            error!(user_id = id, error = %err, "Failed to fetch user");
            Err(err)
        }
    }
}

/// GET /users
async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    match state.services.users.list().await {
        Ok(users) => {
            info!(count = users.len(), "Users listed");
            Ok(Json(users))
        }
        Err(err) => {
            error!(error = %err, "Failed to list users");
            Err(err)
        }
    }
}

/// PUT /users/{id}
async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    ValidatedJson(payload): ValidatedJson<UserPayload>,
) -> AppResult<Json<UserResponse>> {
    let (name, dob) = split_payload(payload)?;

    match state.services.users.update(id, &name, dob).await {
        Ok(user) => {
            info!(user_id = id, user_name = %user.name, "User updated");
            Ok(Json(user))
        }
        Err(err @ AppError::NotFound { .. }) => {
            debug!(user_id = id, "User not found");
            Err(err)
        }
        Err(err) => {
            error!(user_id = id, user_name = %name, error = %err, "Failed to update user");
            Err(err)
        }
    }
}

/// DELETE /users/{id}
async fn delete_user(State(state): State<AppState>, UserId(id): UserId) -> AppResult<StatusCode> {
    match state.services.users.delete(id).await {
        Ok(()) => {
            info!(user_id = id, "User deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(err) => {
            error!(user_id = id, error = %err, "Failed to delete user");
            Err(err)
        }
    }
}
