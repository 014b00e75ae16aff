use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuthError, ClaimRole, Role};

/// Issuer stamped into every credential this service mints.
pub const ISSUER: &str = "firmreg";

/// Lifetime of an issued credential, in seconds.
pub const TOKEN_TTL_SECS: i64 = 5 * 60;

pub fn token_ttl() -> Duration {
    Duration::seconds(TOKEN_TTL_SECS)
}

/// Claims carried inside a credential.
///
/// Timestamps are whole seconds (JWT NumericDate), so a verified token yields
/// exactly the record that was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username the credential was issued to.
    pub sub: String,

    pub role: ClaimRole,

    pub iss: String,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

impl Claims {
    /// Build claims for `subject`, valid for [`token_ttl`] from `issued_at`.
    pub fn new(subject: impl Into<String>, role: Role, issued_at: DateTime<Utc>) -> Self {
        let iat = issued_at.trunc_subsecs(0);
        Self {
            sub: subject.into(),
            role: role.into(),
            iss: ISSUER.to_string(),
            iat,
            exp: iat + token_ttl(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.iat
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.exp
    }
}

/// Deterministically validate decoded claims against `now`.
///
/// Signature checks happen before this, in the signer. The exact `exp`
/// instant already counts as expired; there is no leeway.
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), AuthError> {
    if claims.iss != ISSUER {
        return Err(AuthError::MalformedToken);
    }
    if claims.exp <= claims.iat {
        return Err(AuthError::MalformedToken);
    }
    if now >= claims.exp {
        return Err(AuthError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_900_000_000, 0).unwrap()
    }

    #[test]
    fn expiry_is_issue_time_plus_five_minutes() {
        let claims = Claims::new("alice", Role::Admin, t0());
        assert_eq!(claims.exp - claims.iat, Duration::minutes(5));
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn sub_second_precision_is_dropped_at_issue() {
        let now = t0() + Duration::milliseconds(750);
        let claims = Claims::new("alice", Role::Reader, now);
        assert_eq!(claims.iat, t0());
    }

    #[test]
    fn boundary_instant_counts_as_expired() {
        let claims = Claims::new("alice", Role::Reader, t0());
        assert_eq!(validate_claims(&claims, claims.exp - Duration::seconds(1)), Ok(()));
        assert_eq!(validate_claims(&claims, claims.exp), Err(AuthError::Expired));
        assert_eq!(
            validate_claims(&claims, claims.exp + Duration::seconds(1)),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn foreign_issuer_is_malformed() {
        let mut claims = Claims::new("alice", Role::Admin, t0());
        claims.iss = "someone-else".into();
        assert_eq!(validate_claims(&claims, t0()), Err(AuthError::MalformedToken));
    }

    #[test]
    fn inverted_window_is_malformed() {
        let mut claims = Claims::new("alice", Role::Admin, t0());
        claims.exp = claims.iat;
        assert_eq!(validate_claims(&claims, t0()), Err(AuthError::MalformedToken));
    }
}
