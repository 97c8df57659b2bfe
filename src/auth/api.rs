//! Authentication API Endpoints
//! Mission: Provide registration, login, and gated example endpoints

use crate::auth::{
    jwt::JwtHandler,
    models::{LoginRequest, LoginResponse, RegisterRequest, UserResponse},
    user_store::UserStore,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
        }
    }
}

/// Register endpoint - POST /api/register
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AuthApiError> {
    let username = payload.username.trim();

    if username.is_empty() || payload.password.is_empty() {
        return Err(AuthApiError::MissingField);
    }

    let existing = state
        .user_store
        .get_user_by_username(username)
        .map_err(|_| AuthApiError::InternalError)?;
    if existing.is_some() {
        return Err(AuthApiError::UsernameTaken);
    }

    // A racing registration can still trip the UNIQUE constraint here.
    let user = state
        .user_store
        .create_user(username, &payload.password)
        .map_err(|e| {
            warn!("Failed to create user {}: {}", username, e);
            AuthApiError::UsernameTaken
        })?;

    info!("✅ Registered user: {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// Login endpoint - POST /api/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    let username = payload.username.trim();

    if username.is_empty() || payload.password.is_empty() {
        return Err(AuthApiError::MissingField);
    }

    info!("🔐 Login attempt: {}", username);

    let valid = state
        .user_store
        .verify_password(username, &payload.password)
        .map_err(|_| AuthApiError::InternalError)?;

    if !valid {
        warn!("❌ Failed login attempt: {}", username);
        return Err(AuthApiError::InvalidCredentials);
    }

    let user = state
        .user_store
        .get_user_by_username(username)
        .map_err(|_| AuthApiError::InternalError)?
        .ok_or(AuthApiError::InvalidCredentials)?;

    let (token, expires_in) = state
        .jwt_handler
        .generate_token(&user)
        .map_err(|_| AuthApiError::InternalError)?;

    // Best-effort; a failed stamp never blocks the login response.
    if let Err(e) = state.user_store.record_login(username) {
        warn!("Failed to record login for {}: {}", username, e);
    }

    info!("✅ Login successful: {}", user.username);

    Ok(Json(LoginResponse {
        token,
        expires_in,
        user: UserResponse::from_user(&user),
    }))
}

/// Example gated route - GET /api/protected
///
/// The auth middleware has already verified the token and resolved the
/// identity; it arrives here as an extension.
pub async fn protected(Extension(user): Extension<UserResponse>) -> Json<serde_json::Value> {
    Json(json!({
        "message": "You have access to protected data",
        "username": user.username,
    }))
}

/// Current user info - GET /api/auth/me
pub async fn get_current_user(Extension(user): Extension<UserResponse>) -> Json<UserResponse> {
    Json(user)
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    MissingField,
    UsernameTaken,
    InvalidCredentials,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::MissingField => {
                (StatusCode::BAD_REQUEST, "Username and password are required")
            }
            AuthApiError::UsernameTaken => (StatusCode::CONFLICT, "Username already exists"),
            // One message for unknown-user and wrong-password alike, so
            // responses never confirm which usernames exist.
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password")
            }
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_api_error_responses() {
        let missing = AuthApiError::MissingField.into_response();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let taken = AuthApiError::UsernameTaken.into_response();
        assert_eq!(taken.status(), StatusCode::CONFLICT);

        let invalid = AuthApiError::InvalidCredentials.into_response();
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

        let internal = AuthApiError::InternalError.into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
