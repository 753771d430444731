/// User management endpoints
///
/// # Endpoints
///
/// - `GET /users/me` - The authenticated user
/// - `GET /users` - List all users (admin only)
/// - `GET /users/:id` - Read a user (self or admin)
/// - `PATCH /users/:id` - Update a user (self or admin)
/// - `DELETE /users/:id` - Delete a user (admin only)
///
/// # Authorization
///
/// Read and update are gated by the self-or-admin policy. The `is_admin`
/// field is special: a non-admin updating their own account may send it,
/// but it is silently ignored — only the fields the actor is permitted to
/// change are applied.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sprintsync_shared::{
    auth::{
        authorization::{require_admin, require_self_or_admin},
        middleware::AuthContext,
        password,
    },
    models::{
        task::Task,
        user::{UpdateUser, User},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Public view of a user (never exposes the password hash)
#[derive(Debug, Serialize)]
pub struct UserOut {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Login name
    pub username: String,

    /// Admin flag
    pub is_admin: bool,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            is_admin: user.is_admin,
        }
    }
}

/// Partial user update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New login name
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: Option<String>,

    /// New password (re-hashed before storage)
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: Option<String>,

    /// New admin flag (applied only when the actor is an admin)
    pub is_admin: Option<bool>,
}

/// Returns the authenticated user
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserOut>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserOut::from(user)))
}

/// Lists all users (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<UserOut>>> {
    require_admin(&auth)?;

    let users = User::list(&state.db).await?;

    Ok(Json(users.into_iter().map(UserOut::from).collect()))
}

/// Reads a single user (self or admin)
///
/// The policy check runs before the lookup, so a non-admin probing a
/// foreign id gets 403 whether or not that user exists.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserOut>> {
    require_self_or_admin(&auth, user_id)?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserOut::from(user)))
}

/// Updates a user (self or admin)
///
/// Only fields present in the payload are applied. A non-admin actor's
/// `is_admin` value is dropped without error.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserOut>> {
    require_self_or_admin(&auth, user_id)?;
    req.validate()?;

    // Existence check up front so an empty update still 404s correctly
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let password_hash = match req.password {
        Some(password) => Some(password::hash_password(&password)?),
        None => None,
    };

    let update = UpdateUser {
        email: req.email,
        username: req.username,
        password_hash,
        // Only admins may grant or revoke the admin flag; for everyone
        // else the field is silently ignored rather than rejected
        is_admin: if auth.is_admin { req.is_admin } else { None },
    };

    let user = User::update(&state.db, user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserOut::from(user)))
}

/// Deletes a user (admin only)
///
/// Refused with 409 while the user still owns tasks, so `owner_id` always
/// points at an existing user.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&auth)?;

    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let owned_tasks = Task::count_by_owner(&state.db, user_id).await?;
    if owned_tasks > 0 {
        return Err(ApiError::Conflict(format!(
            "User still owns {} task(s); delete or reassign them first",
            owned_tasks
        )));
    }

    User::delete(&state.db, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_out_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "alice@sprintsync.dev".to_string(),
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            is_admin: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let out = UserOut::from(user);
        let json = serde_json::to_string(&out).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("alice"));
    }

    #[test]
    fn test_update_request_absent_vs_empty() {
        // Absent fields deserialize to None
        let req: UpdateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(req.email.is_none());
        assert!(req.is_admin.is_none());

        // Present-but-empty username is distinguishable from absent, and
        // rejected by validation rather than silently skipped
        let req: UpdateUserRequest = serde_json::from_str(r#"{"username": ""}"#).unwrap();
        assert_eq!(req.username.as_deref(), Some(""));
        assert!(req.validate().is_err());
    }
}
