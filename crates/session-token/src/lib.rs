//! Session tokens
//!
//! Issues HS256-signed JWTs carrying an email identity and a fixed 24 hour
//! expiry, and validates them. Tokens cannot be revoked; they stay valid
//! until `exp` passes.

mod error;
mod service;

pub use error::TokenError;
pub use service::{SessionClaims, TokenService, SESSION_LIFETIME_HOURS};
