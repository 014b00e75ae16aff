//! Registered user accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use firmreg_core::{DomainError, DomainResult, UserId};

use crate::Role;

pub const MAX_USERNAME_LEN: usize = 64;

/// Stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Validated registration input.
///
/// The role is parsed here, at the issuance boundary, so nothing downstream
/// ever sees a free-form role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl Registration {
    pub fn parse(username: &str, password: &str, role: &str) -> DomainResult<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("username is required"));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(DomainError::validation(format!(
                "username must be at most {MAX_USERNAME_LEN} characters"
            )));
        }
        if password.is_empty() {
            return Err(DomainError::validation("password is required"));
        }
        let role = role
            .parse::<Role>()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
            role,
        })
    }

    /// Turn the registration into a storable user once the password is hashed.
    pub fn into_user(self, password_hash: String, now: DateTime<Utc>) -> User {
        User {
            id: UserId::new(),
            username: self.username,
            password_hash,
            role: self.role,
            created_at: now,
        }
    }
}
