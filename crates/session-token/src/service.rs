use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TokenError;

/// Lifetime of every issued token. Tokens are never refreshed in place.
pub const SESSION_LIFETIME_HOURS: i64 = 24;

/// Wire claims carried inside the JWT
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    email: String,
    exp: i64,
}

/// Claims recovered from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub identity: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates session tokens with a process-wide symmetric key.
///
/// Validation is pure; one instance may be shared across any number of
/// concurrent requests.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Create a service from the signing secret loaded at startup
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        // Expiry is checked against an explicit `now` in `validate_at`
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Issue a token for `identity` expiring 24 hours from now
    pub fn issue(&self, identity: &str) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, identity: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            email: identity.to_string(),
            exp: (now + Duration::hours(SESSION_LIFETIME_HOURS)).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify a token's signature and expiry
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// A token is valid only while `now < expires_at`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                let err = TokenError::from(e);
                debug!(error = %err, "Token rejected");
                err
            })?;

        let expires_at = DateTime::from_timestamp(data.claims.exp, 0)
            .ok_or_else(|| TokenError::Malformed(format!("exp out of range: {}", data.claims.exp)))?;

        if expires_at <= now {
            debug!(identity = %data.claims.email, %expires_at, "Token expired");
            return Err(TokenError::Expired);
        }

        Ok(SessionClaims {
            identity: data.claims.email,
            expires_at,
        })
    }
}
