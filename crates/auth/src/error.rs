use thiserror::Error;

/// Why a request was refused a credential-backed decision.
///
/// Every variant is terminal for the request. The API layer maps all of
/// them to `401 Unauthorized`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingCredential,

    #[error("authorization header must use the Bearer scheme")]
    MalformedCredential,

    #[error("token is malformed")]
    MalformedToken,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("insufficient role for this operation")]
    InsufficientRole,
}

impl AuthError {
    /// Stable machine-readable code used in error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedCredential => "malformed_credential",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "token_expired",
            AuthError::InsufficientRole => "insufficient_role",
        }
    }
}
