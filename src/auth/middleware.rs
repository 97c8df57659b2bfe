//! Authentication Middleware
//! Mission: Verify bearer tokens and hand handlers the resolved identity

use crate::auth::{api::AuthState, models::UserResponse};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

/// Auth middleware that validates JWT tokens.
///
/// Accepts `Authorization: Bearer <token>` as well as a bare token value.
/// The token subject is resolved against the user store; a token whose
/// user no longer exists is rejected the same way as a bad token.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let claims = state
        .jwt_handler
        .validate_token(token)
        .map_err(|_| AuthError::InvalidToken)?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
    let user = state
        .user_store
        .get_user_by_id(&user_id)
        .map_err(|_| AuthError::InvalidToken)?
        .ok_or(AuthError::InvalidToken)?;

    // Hand the sanitized identity to the handler as an extension.
    req.extensions_mut().insert(UserResponse::from_user(&user));

    Ok(next.run(req).await)
}

/// Auth middleware error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authorization token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
