use std::fmt;

/// Failure of the durable store. Never swallowed.
#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    EmailTaken(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(e) => write!(f, "Database error: {e}"),
            Self::EmailTaken(email) => write!(f, "Email already registered: {email}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e)
    }
}

/// Failure of the metadata cache. Logged by callers, never propagated.
#[derive(Debug)]
pub enum CacheError {
    Serialize(serde_json::Error),
    Deserialize(serde_json::Error),
    Unavailable(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize(e) => write!(f, "Failed to serialize cache entry: {e}"),
            Self::Deserialize(e) => write!(f, "Failed to deserialize cache entry: {e}"),
            Self::Unavailable(msg) => write!(f, "Cache unavailable: {msg}"),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialize(e) | Self::Deserialize(e) => Some(e),
            Self::Unavailable(_) => None,
        }
    }
}
