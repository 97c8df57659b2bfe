use axum::{
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::auth::{api as auth_api, auth_middleware, AuthState};
use crate::catalog::CatalogStore;
use crate::middleware::request_logging;
use crate::models::Product;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
}

/// Create the API router
pub fn create_router(catalog: Arc<CatalogStore>, auth_state: AuthState) -> Router {
    let state = AppState { catalog };

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/products", get(get_products))
        .with_state(state);

    let auth_routes = Router::new()
        .route("/api/register", post(auth_api::register))
        .route("/api/login", post(auth_api::login))
        .with_state(auth_state.clone());

    // Token verification runs before these handlers; they receive the
    // resolved identity as an extension.
    let protected_routes = Router::new()
        .route("/api/protected", get(auth_api::protected))
        .route("/api/auth/me", get(auth_api::get_current_user))
        .layer(from_fn_with_state(auth_state, auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(protected_routes)
        .layer(from_fn(request_logging))
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List the product catalog
async fn get_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.catalog.list_products()?;
    Ok(Json(products))
}

// ===== Response Types =====

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

// ===== Error Handling =====

#[derive(Debug)]
enum ApiError {
    Database(anyhow::Error),
    #[allow(dead_code)] // Reserved for per-product lookups
    NotFound(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Database(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err = anyhow::anyhow!("Test error");
        let api_err: ApiError = err.into();

        match api_err {
            ApiError::Database(_) => (),
            _ => panic!("Expected Database error"),
        }
    }

    #[test]
    fn test_error_responses() {
        let db_err = ApiError::Database(anyhow::anyhow!("boom")).into_response();
        assert_eq!(db_err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let not_found = ApiError::NotFound("Product 9 not found".to_string()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
    }
}
