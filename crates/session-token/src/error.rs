use std::fmt;

/// Errors from issuing or validating session tokens.
///
/// Validation causes are distinct here for logging; the HTTP boundary
/// collapses them into a single unauthorized outcome.
#[derive(Debug)]
pub enum TokenError {
    EmptySecret,
    Signing(jsonwebtoken::errors::Error),
    InvalidSignature,
    Malformed(String),
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySecret => write!(f, "Signing secret must not be empty"),
            Self::Signing(e) => write!(f, "Failed to sign token: {e}"),
            Self::InvalidSignature => write!(f, "Token signature mismatch"),
            Self::Malformed(msg) => write!(f, "Malformed token: {msg}"),
            Self::Expired => write!(f, "Token expired"),
        }
    }
}

impl std::error::Error for TokenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Signing(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed(err.to_string()),
        }
    }
}
