//! Per-request authorization gate.
//!
//! `header -> bearer token -> verified claims -> role check`. The gate holds
//! no mutable state; a denial at any step is final for the request.

use chrono::{DateTime, Utc};

use crate::{AccessKind, AuthError, Claims, TokenService};

/// Scheme prefix expected on the `Authorization` header (case-sensitive).
pub const BEARER_SCHEME: &str = "Bearer ";

#[derive(Clone)]
pub struct AuthorizationGate {
    tokens: TokenService,
}

impl AuthorizationGate {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Authorize a request given its raw `Authorization` header and method.
    ///
    /// Returns the verified claims on success.
    pub fn authorize(&self, header: Option<&str>, method: &str) -> Result<Claims, AuthError> {
        self.authorize_at(header, method, Utc::now())
    }

    pub fn authorize_at(
        &self,
        header: Option<&str>,
        method: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, AuthError> {
        let token = extract_bearer(header)?;
        let claims = self.tokens.verify_at(token, now)?;

        if !AccessKind::for_method(method).permits(&claims.role) {
            tracing::debug!(subject = %claims.sub, role = %claims.role, method, "role does not permit method");
            return Err(AuthError::InsufficientRole);
        }

        Ok(claims)
    }
}

/// Pull the token out of a `Bearer <token>` header value.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredential)?;

    let token = header
        .strip_prefix(BEARER_SCHEME)
        .ok_or(AuthError::MalformedCredential)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MalformedCredential);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Role, SigningKey};
    use chrono::{Duration, TimeZone};

    fn gate() -> AuthorizationGate {
        AuthorizationGate::new(TokenService::hs256(&SigningKey::new("gate-secret").unwrap()))
    }

    fn bearer(gate: &AuthorizationGate, role: Role) -> String {
        let issued = gate.tokens().issue("alice", role).unwrap();
        format!("Bearer {}", issued.token)
    }

    #[test]
    fn missing_header_is_missing_credential() {
        assert_eq!(gate().authorize(None, "GET"), Err(AuthError::MissingCredential));
    }

    #[test]
    fn wrong_scheme_is_malformed_credential() {
        let g = gate();
        let token = g.tokens().issue("alice", Role::Admin).unwrap().token;

        for header in [token.clone(), format!("Basic {token}"), format!("bearer {token}"), "Bearer ".to_string(), "Bearer    ".to_string()] {
            assert_eq!(
                g.authorize(Some(header.as_str()), "GET"),
                Err(AuthError::MalformedCredential),
                "{header}"
            );
        }
    }

    #[test]
    fn verification_errors_propagate_unchanged() {
        let g = gate();
        assert_eq!(g.authorize(Some("Bearer junk"), "GET"), Err(AuthError::MalformedToken));

        let other = TokenService::hs256(&SigningKey::new("other-secret").unwrap());
        let foreign = other.issue("alice", Role::Admin).unwrap().token;
        assert_eq!(
            g.authorize(Some(format!("Bearer {foreign}").as_str()), "GET"),
            Err(AuthError::InvalidSignature)
        );

        let t0 = Utc.timestamp_opt(1_900_000_000, 0).unwrap();
        let old = g.tokens().issue_at("alice", Role::Admin, t0).unwrap().token;
        assert_eq!(
            g.authorize_at(Some(format!("Bearer {old}").as_str()), "GET", t0 + Duration::minutes(6)),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn reader_cannot_mutate() {
        let g = gate();
        let header = bearer(&g, Role::Reader);
        for method in ["POST", "PATCH", "DELETE", "PUT"] {
            assert_eq!(g.authorize(Some(header.as_str()), method), Err(AuthError::InsufficientRole));
        }
    }

    #[test]
    fn admin_can_mutate() {
        let g = gate();
        let header = bearer(&g, Role::Admin);
        for method in ["POST", "PATCH", "DELETE"] {
            let claims = g.authorize(Some(header.as_str()), method).unwrap();
            assert_eq!(claims.role, Role::Admin);
        }
    }

    #[test]
    fn safe_methods_allowed_for_every_role() {
        let g = gate();
        for role in [Role::Admin, Role::Reader] {
            let header = bearer(&g, role);
            for method in ["GET", "HEAD", "OPTIONS"] {
                assert_eq!(g.authorize(Some(header.as_str()), method).unwrap().role, role);
            }
        }
    }

    #[test]
    fn unrecognized_role_is_read_only() {
        let g = gate();
        let t0 = Utc.timestamp_opt(1_900_000_000, 0).unwrap();
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &serde_json::json!({
                "sub": "legacy",
                "role": "auditor",
                "iss": crate::ISSUER,
                "iat": t0.timestamp(),
                "exp": (t0 + Duration::minutes(5)).timestamp(),
            }),
            &jsonwebtoken::EncodingKey::from_secret(b"gate-secret"),
        )
        .unwrap();
        let header = format!("Bearer {token}");

        for method in ["GET", "HEAD", "OPTIONS"] {
            let claims = g.authorize_at(Some(header.as_str()), method, t0).unwrap();
            assert_eq!(claims.role.as_str(), "auditor");
        }
        for method in ["POST", "PATCH", "DELETE"] {
            assert_eq!(
                g.authorize_at(Some(header.as_str()), method, t0),
                Err(AuthError::InsufficientRole)
            );
        }
    }

    #[test]
    fn surrounding_whitespace_after_scheme_is_tolerated() {
        let g = gate();
        let token = g.tokens().issue("alice", Role::Reader).unwrap().token;
        assert!(g.authorize(Some(format!("Bearer  {token} ").as_str()), "GET").is_ok());
    }
}
