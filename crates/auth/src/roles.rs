use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role carried in a credential.
///
/// The vocabulary is closed. `admin` may read and write; `reader` is
/// read-only. `user` is accepted as a legacy spelling of `reader`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(alias = "user")]
    Reader,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}' (expected 'admin' or 'reader')")]
pub struct UnknownRole(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Reader => "reader",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "reader" | "user" => Ok(Role::Reader),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role as read back from a verified credential.
///
/// Only [`Role`] values are ever issued, but a correctly signed token may
/// still name a role outside the vocabulary. Such a role is kept verbatim
/// and grants read access only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimRole {
    Known(Role),
    Unrecognized(String),
}

impl ClaimRole {
    pub fn as_str(&self) -> &str {
        match self {
            ClaimRole::Known(role) => role.as_str(),
            ClaimRole::Unrecognized(name) => name,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, ClaimRole::Known(Role::Admin))
    }

    pub fn known(&self) -> Option<Role> {
        match self {
            ClaimRole::Known(role) => Some(*role),
            ClaimRole::Unrecognized(_) => None,
        }
    }
}

impl From<Role> for ClaimRole {
    fn from(role: Role) -> Self {
        ClaimRole::Known(role)
    }
}

impl PartialEq<Role> for ClaimRole {
    fn eq(&self, other: &Role) -> bool {
        self.known() == Some(*other)
    }
}

impl core::fmt::Display for ClaimRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
