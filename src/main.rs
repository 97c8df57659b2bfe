//! Storefront Backend
//! Mission: Serve the product catalog behind a token-guarded API

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::path::Path;
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_backend::{
    api::create_router,
    auth::{AuthState, JwtHandler, UserStore},
    catalog::CatalogStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    info!("🛍️  Storefront backend starting");

    let auth_db_path =
        env::var("AUTH_DB_PATH").unwrap_or_else(|_| "storefront_auth.db".to_string());
    let catalog_db_path =
        env::var("CATALOG_DB_PATH").unwrap_or_else(|_| "storefront_catalog.db".to_string());
    let jwt_secret = env::var("JWT_SECRET")
        .unwrap_or_else(|_| "dev-secret-change-in-production-minimum-32-characters".to_string());

    let user_store = Arc::new(UserStore::new(&auth_db_path)?);
    let jwt_handler = Arc::new(JwtHandler::new(&jwt_secret));
    let auth_state = AuthState::new(user_store, jwt_handler);
    info!("🔐 Authentication initialized at: {}", auth_db_path);

    let catalog = Arc::new(CatalogStore::new(&catalog_db_path)?);
    info!("🛒 Catalog initialized at: {}", catalog_db_path);

    let app = create_router(catalog, auth_state).layer(CorsLayer::permissive());

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT")
        .unwrap_or_else(|_| "5000".to_string())
        .parse::<u16>()
        .context("Invalid port")?;

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter support
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // Also try the manifest dir .env (common when running with
    // --manifest-path from elsewhere).
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
