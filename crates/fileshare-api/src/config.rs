use std::env;

use crate::constants::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT};

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// HS256 signing secret for session tokens. Loaded once, never reloaded.
    pub jwt_secret: String,
    pub blob_dir: String,
    pub public_blob_url: String,
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Parse configuration from environment variables.
    ///
    /// Fails when `JWT_SECRET` is unset or empty.
    pub fn from_env() -> Result<Self, String> {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/fileshare".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "JWT_SECRET must be set".to_string())?;

        let blob_dir = env::var("BLOB_DIR").unwrap_or_else(|_| "uploads".to_string());

        let public_blob_url = env::var("PUBLIC_BLOB_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}/uploads"));

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["http://localhost:3000".to_string()]);

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Ok(Self {
            port,
            database_url,
            jwt_secret,
            blob_dir,
            public_blob_url,
            cors_origins,
            max_upload_bytes,
        })
    }
}
