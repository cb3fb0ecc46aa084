use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use session_token::TokenService;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request failed authentication. Logged, never shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unauthorized {
    MissingHeader,
    MalformedHeader,
    InvalidOrExpired,
}

impl fmt::Display for Unauthorized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "Missing Authorization header"),
            Self::MalformedHeader => write!(f, "Authorization header is not a bearer token"),
            Self::InvalidOrExpired => write!(f, "Invalid or expired token"),
        }
    }
}

impl std::error::Error for Unauthorized {}

impl From<Unauthorized> for AppError {
    fn from(_: Unauthorized) -> Self {
        AppError::Unauthorized
    }
}

/// Resolve the identity carried by a request's bearer token
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<String, Unauthorized> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(Unauthorized::MissingHeader)?;
    let value = header.to_str().map_err(|_| Unauthorized::MalformedHeader)?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(Unauthorized::MalformedHeader)?;

    tokens
        .validate(token)
        .map(|claims| claims.identity)
        .map_err(|_| Unauthorized::InvalidOrExpired)
}

/// Authenticated caller, resolved to a stored user
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Axum extractor that validates the bearer token and returns an [`AuthUser`].
///
/// A valid token whose user no longer exists is rejected as unauthorized.
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let email = authenticate(&parts.headers, &state.tokens).map_err(|reason| {
            debug!(%reason, "Rejected request");
            reason
        })?;

        let user = state.store.get_user_by_email(&email).await?.ok_or_else(|| {
            debug!(email = %email, "Token identity has no user");
            AppError::Unauthorized
        })?;

        Ok(AuthUser { user_id: user.id })
    }
}
