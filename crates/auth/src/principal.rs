use chrono::{DateTime, Utc};

use crate::{ClaimRole, Claims};

/// Authenticated identity for the lifetime of one request.
///
/// Derived from verified claims; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: String,
    role: ClaimRole,
    expires_at: DateTime<Utc>,
}

impl Principal {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn role(&self) -> &ClaimRole {
        &self.role
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
            expires_at: claims.exp,
        }
    }
}
