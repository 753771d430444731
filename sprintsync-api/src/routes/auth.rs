/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new user
/// - `POST /auth/token` - Login and receive a bearer token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::users::UserOut,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use sprintsync_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Login name
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: String,

    /// Password (stored as Argon2id hash)
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,

    /// Whether the new account holds the admin flag
    #[serde(default)]
    pub is_admin: bool,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login name
    pub username: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Bearer token (JWT)
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "email": "alice@sprintsync.dev",
///   "username": "alice",
///   "password": "alice123"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email or username already taken
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserOut>)> {
    req.validate()?;

    // Pre-check both uniqueness invariants for precise messages; the DB
    // unique constraints remain the backstop under races
    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }
    if User::find_by_username(&state.db, &req.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            username: req.username,
            password_hash,
            is_admin: req.is_admin,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(UserOut::from(user))))
}

/// Login and receive a bearer token
///
/// # Endpoint
///
/// ```text
/// POST /auth/token
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "alice123"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password (the message
///   is identical for both so the endpoint doesn't leak which accounts
///   exist)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let invalid = || ApiError::Unauthorized("Incorrect username or password".to_string());

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(invalid)?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(invalid());
    }

    let claims = jwt::Claims::new(
        user.id,
        Duration::minutes(state.config.jwt.access_token_expire_minutes),
    );
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
