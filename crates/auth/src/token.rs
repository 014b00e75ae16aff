//! Credential issuance and verification.
//!
//! The signing mechanism sits behind [`TokenSigner`]; [`TokenService`] adds
//! the issuance policy (issuer, TTL) and the time-based checks on top.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::{AuthError, Claims, Role, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("signing key variable {0} is not set")]
    Missing(String),

    #[error("signing key variable {0} is not valid unicode")]
    NotUnicode(String),

    #[error("signing key is empty")]
    Empty,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Symmetric secret used for HMAC signing.
///
/// Construction fails on an empty secret so a misconfigured process never
/// signs with an empty key.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, KeyError> {
        let secret = secret.into();
        if secret.iter().all(u8::is_ascii_whitespace) {
            return Err(KeyError::Empty);
        }
        Ok(Self(secret))
    }

    /// Read the secret from environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self, KeyError> {
        match std::env::var(var) {
            Ok(value) => Self::new(value),
            Err(std::env::VarError::NotPresent) => Err(KeyError::Missing(var.to_string())),
            Err(std::env::VarError::NotUnicode(_)) => Err(KeyError::NotUnicode(var.to_string())),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Signing capability.
///
/// `verify` checks the signature and decodes the claims. Time-window checks
/// are applied by [`TokenService`], so a swapped-in scheme only has to
/// handle bytes.
pub trait TokenSigner: Send + Sync {
    fn sign(&self, claims: &Claims) -> Result<String, TokenError>;

    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// HS256 JWT signer.
pub struct Hs256Signer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256Signer {
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against an explicit clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }
}

impl TokenSigner for Hs256Signer {
    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::MalformedToken,
            })
    }
}

/// A freshly minted credential and the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Issues and verifies short-lived credentials.
#[derive(Clone)]
pub struct TokenService {
    signer: Arc<dyn TokenSigner>,
}

impl TokenService {
    pub fn new(signer: Arc<dyn TokenSigner>) -> Self {
        Self { signer }
    }

    pub fn hs256(key: &SigningKey) -> Self {
        Self::new(Arc::new(Hs256Signer::new(key)))
    }

    pub fn issue(&self, subject: &str, role: Role) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let claims = Claims::new(subject, role, now);
        let token = self.signer.sign(&claims)?;
        tracing::debug!(subject, role = %role, expires_at = %claims.exp, "issued token");
        Ok(IssuedToken { token, claims })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let claims = self.signer.verify(token)?;
        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClaimRole;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn service(secret: &str) -> TokenService {
        TokenService::hs256(&SigningKey::new(secret).unwrap())
    }

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_900_000_000, 0).unwrap()
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert_eq!(SigningKey::new("").unwrap_err(), KeyError::Empty);
        assert_eq!(SigningKey::new("  \n").unwrap_err(), KeyError::Empty);
    }

    #[test]
    fn unset_variable_is_reported() {
        let err = SigningKey::from_env("FIRMREG_TEST_SURELY_UNSET_SIGNING_KEY").unwrap_err();
        assert_eq!(err, KeyError::Missing("FIRMREG_TEST_SURELY_UNSET_SIGNING_KEY".into()));
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_variable_is_reported() {
        use std::os::unix::ffi::OsStringExt;

        let var = "FIRMREG_TEST_NON_UNICODE_SIGNING_KEY";
        // Only this test touches the variable.
        unsafe { std::env::set_var(var, std::ffi::OsString::from_vec(vec![0x66, 0x6f, 0xff])) };

        assert_eq!(SigningKey::from_env(var).unwrap_err(), KeyError::NotUnicode(var.into()));
    }

    #[test]
    fn set_variable_is_loaded() {
        let var = "FIRMREG_TEST_SET_SIGNING_KEY";
        unsafe { std::env::set_var(var, "from-env") };

        assert_eq!(SigningKey::from_env(var).unwrap().as_bytes(), b"from-env");
    }

    #[test]
    fn key_debug_does_not_leak_secret() {
        let key = SigningKey::new("hunter2").unwrap();
        assert!(!format!("{key:?}").contains("hunter2"));
    }

    #[test]
    fn verify_returns_issued_claims() {
        let svc = service("test-secret");
        let issued = svc.issue("alice", Role::Admin).unwrap();

        let claims = svc.verify(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn token_expires_at_exactly_five_minutes() {
        let svc = service("test-secret");
        let issued = svc.issue_at("bob", Role::Reader, t0()).unwrap();

        let just_before = t0() + Duration::minutes(5) - Duration::seconds(1);
        assert!(svc.verify_at(&issued.token, just_before).is_ok());
        assert_eq!(
            svc.verify_at(&issued.token, t0() + Duration::minutes(5)),
            Err(AuthError::Expired)
        );
        assert_eq!(
            svc.verify_at(&issued.token, t0() + Duration::hours(1)),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn altered_signature_is_invalid_signature() {
        let svc = service("test-secret");
        let token = svc.issue("alice", Role::Admin).unwrap().token;

        let (message, signature) = token.rsplit_once('.').unwrap();
        let first = signature.chars().next().unwrap();
        let replacement = if first == 'A' { 'B' } else { 'A' };
        let tampered = format!("{message}.{replacement}{}", &signature[1..]);

        assert_eq!(svc.verify(&tampered), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn altered_payload_is_invalid_signature() {
        let svc = service("test-secret");
        let reader = svc.issue("mallory", Role::Reader).unwrap().token;
        let admin = svc.issue("mallory", Role::Admin).unwrap().token;

        // Graft the admin payload onto the reader signature.
        let reader_parts: Vec<&str> = reader.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", reader_parts[0], admin_parts[1], reader_parts[2]);

        assert_eq!(svc.verify(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn foreign_secret_is_invalid_signature() {
        let token = service("secret-one").issue("alice", Role::Admin).unwrap().token;
        assert_eq!(service("secret-two").verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = service("test-secret");
        assert_eq!(svc.verify("not-a-token"), Err(AuthError::MalformedToken));
        assert_eq!(svc.verify("a.b.c"), Err(AuthError::MalformedToken));
        assert_eq!(svc.verify(""), Err(AuthError::MalformedToken));
    }

    #[test]
    fn signed_token_with_unknown_role_verifies_as_unrecognized() {
        let claims = serde_json::json!({
            "sub": "legacy",
            "role": "auditor",
            "iss": crate::ISSUER,
            "iat": t0().timestamp(),
            "exp": (t0() + Duration::minutes(5)).timestamp(),
        });
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let verified = service("test-secret").verify_at(&token, t0()).unwrap();
        assert_eq!(verified.role, ClaimRole::Unrecognized("auditor".into()));
        assert!(!verified.role.is_admin());
    }

    #[test]
    fn signed_token_with_non_string_role_is_malformed() {
        let claims = serde_json::json!({
            "sub": "alice",
            "role": 7,
            "iss": crate::ISSUER,
            "iat": t0().timestamp(),
            "exp": (t0() + Duration::minutes(5)).timestamp(),
        });
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(service("test-secret").verify_at(&token, t0()), Err(AuthError::MalformedToken));
    }

    #[test]
    fn other_algorithms_are_malformed() {
        let claims = Claims::new("alice", Role::Admin, Utc::now());
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(service("test-secret").verify(&token), Err(AuthError::MalformedToken));
    }

    proptest! {
        #[test]
        fn issue_then_verify_round_trips(
            subject in "[A-Za-z0-9_.@-]{1,32}",
            admin in any::<bool>(),
        ) {
            let role = if admin { Role::Admin } else { Role::Reader };
            let svc = service("property-secret");
            let issued = svc.issue(&subject, role).unwrap();
            let claims = svc.verify(&issued.token).unwrap();
            prop_assert_eq!(claims.sub, subject);
            prop_assert_eq!(claims.role, role);
        }
    }
}
