//! File-sharing metadata API
//!
//! Accepts uploads, records their metadata in PostgreSQL behind a
//! cache-aside TTL cache, and gates file routes with bearer session tokens.

mod auth;
mod blob_store;
mod config;
mod constants;
mod credentials;
mod error;
mod routes;
mod state;
mod validation;

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{header, Method};
use fileshare_metadata::{CacheAside, MokaMetadataCache, PgMetadataStore};
use session_token::TokenService;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

use blob_store::FsBlobStore;
use config::Config;
use constants::{BLOB_ROUTE, DB_MAX_CONNECTIONS};
use credentials::CredentialVerifier;
use state::AppState;

#[tokio::main]
async fn main() {
    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fileshare_api=info,fileshare_metadata=info"));

    // Use JSON format for Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let config = Config::from_env().expect("Invalid configuration");
    info!(port = config.port, "Starting fileshare-api");

    // Connect to database
    let pool = PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    fileshare_db::migrate::migrate(&pool)
        .await
        .expect("Failed to run migrations");

    let blobs = FsBlobStore::new(PathBuf::from(&config.blob_dir), &config.public_blob_url);
    blobs.init().await.expect("Failed to create blob directory");
    let serve_blobs = ServeDir::new(blobs.dir());

    let tokens = TokenService::new(config.jwt_secret.as_bytes()).expect("Invalid JWT_SECRET");
    let store = Arc::new(PgMetadataStore::new(pool));
    let cache = Arc::new(MokaMetadataCache::new());

    let state = AppState {
        store: store.clone(),
        files: CacheAside::new(store, cache.clone()),
        cache,
        tokens: Arc::new(tokens),
        credentials: CredentialVerifier::new(),
        blobs: Arc::new(blobs),
        max_upload_bytes: config.max_upload_bytes,
    };

    // CORS
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    let app = routes::create_router(state)
        .nest_service(BLOB_ROUTE, serve_blobs)
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("Failed to bind");

    info!(port = config.port, "Listening");

    axum::serve(listener, app).await.expect("Server failed");
}
