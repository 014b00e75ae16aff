//! `firmreg-auth` — credential issuance, verification and request authorization.
//!
//! This crate is decoupled from HTTP and storage: callers hand it header
//! strings and method names, and get back claims or a typed denial.

pub mod access;
pub mod authorize;
pub mod claims;
pub mod error;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use access::AccessKind;
pub use authorize::{AuthorizationGate, BEARER_SCHEME, extract_bearer};
pub use claims::{Claims, ISSUER, TOKEN_TTL_SECS, token_ttl, validate_claims};
pub use error::AuthError;
pub use password::{BcryptHasher, DEFAULT_BCRYPT_COST, PasswordError, PasswordHasher};
pub use principal::Principal;
pub use roles::{ClaimRole, Role, UnknownRole};
pub use token::{Hs256Signer, IssuedToken, KeyError, SigningKey, TokenError, TokenService, TokenSigner};
pub use user::{Registration, User};
