//! Process configuration, read once at startup from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, ensure};

use firmreg_auth::{DEFAULT_BCRYPT_COST, KeyError, SigningKey};

use crate::rate_limit::RateLimitConfig;

pub const JWT_SECRET_KEY: &str = "JWT_SECRET_KEY";
pub const BIND_ADDR: &str = "BIND_ADDR";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const RATE_LIMIT_CAPACITY: &str = "RATE_LIMIT_CAPACITY";
pub const RATE_LIMIT_WINDOW_SECS: &str = "RATE_LIMIT_WINDOW_SECS";
pub const BCRYPT_COST: &str = "BCRYPT_COST";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8001";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub signing_key: SigningKey,
    /// `None` selects the in-memory stores.
    pub database_url: Option<String>,
    pub rate_limit: RateLimitConfig,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let signing_key = SigningKey::from_env(JWT_SECRET_KEY).context("loading signing key")?;
        Self::load(signing_key, |name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let secret = lookup(JWT_SECRET_KEY).ok_or_else(|| KeyError::Missing(JWT_SECRET_KEY.into()))?;
        let signing_key = SigningKey::new(secret).context("loading signing key")?;
        Self::load(signing_key, lookup)
    }

    fn load(signing_key: SigningKey, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = lookup(BIND_ADDR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid {BIND_ADDR}"))?;

        let defaults = RateLimitConfig::default();
        let capacity = parse_or(&lookup, RATE_LIMIT_CAPACITY, defaults.capacity)?;
        let window_secs = parse_or(&lookup, RATE_LIMIT_WINDOW_SECS, defaults.window.as_secs())?;
        ensure!(capacity > 0, "{RATE_LIMIT_CAPACITY} must be positive");
        ensure!(window_secs > 0, "{RATE_LIMIT_WINDOW_SECS} must be positive");

        let bcrypt_cost = parse_or(&lookup, BCRYPT_COST, DEFAULT_BCRYPT_COST)?;
        ensure!((4..=31).contains(&bcrypt_cost), "{BCRYPT_COST} must be between 4 and 31");

        Ok(Self {
            bind_addr,
            signing_key,
            database_url: database_url(&lookup),
            rate_limit: RateLimitConfig {
                capacity,
                window: Duration::from_secs(window_secs),
            },
            bcrypt_cost,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: core::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().with_context(|| format!("invalid {name}: {raw:?}")),
        None => Ok(default),
    }
}

/// `DATABASE_URL` wins; otherwise the `POSTGRES_*` set is used when
/// `POSTGRES_HOST` is present.
fn database_url(lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
    if let Some(url) = lookup(DATABASE_URL).filter(|u| !u.trim().is_empty()) {
        return Some(url);
    }

    let host = lookup("POSTGRES_HOST")?;
    let get = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
    Some(format!(
        "postgres://{user}:{password}@{host}:{port}/{db}",
        user = get("POSTGRES_USER", "postgres"),
        password = get("POSTGRES_PASSWORD", "postgres"),
        port = get("POSTGRES_PORT", "5432"),
        db = get("POSTGRES_DB", "companies"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() {
        let cfg = load(&[(JWT_SECRET_KEY, "s3cret")]).unwrap();

        assert_eq!(cfg.bind_addr, "0.0.0.0:8001".parse().unwrap());
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.rate_limit.capacity, 600);
        assert_eq!(cfg.rate_limit.window, Duration::from_secs(60));
        assert_eq!(cfg.bcrypt_cost, 14);
    }

    #[test]
    fn missing_or_blank_secret_is_fatal() {
        assert!(load(&[]).is_err());
        assert!(load(&[(JWT_SECRET_KEY, "   ")]).is_err());
    }

    #[test]
    fn missing_secret_names_the_variable() {
        let err = load(&[]).unwrap_err();
        let key_err = err.downcast_ref::<KeyError>().unwrap();
        assert_eq!(key_err, &KeyError::Missing(JWT_SECRET_KEY.into()));
    }

    #[test]
    fn postgres_parts_build_a_url() {
        let cfg = load(&[
            (JWT_SECRET_KEY, "s"),
            ("POSTGRES_HOST", "db"),
            ("POSTGRES_PASSWORD", "pw"),
        ])
        .unwrap();
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://postgres:pw@db:5432/companies"));
    }

    #[test]
    fn database_url_takes_precedence() {
        let cfg = load(&[
            (JWT_SECRET_KEY, "s"),
            (DATABASE_URL, "postgres://u:p@h/d"),
            ("POSTGRES_HOST", "ignored"),
        ])
        .unwrap();
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://u:p@h/d"));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(load(&[(JWT_SECRET_KEY, "s"), (RATE_LIMIT_CAPACITY, "lots")]).is_err());
        assert!(load(&[(JWT_SECRET_KEY, "s"), (RATE_LIMIT_CAPACITY, "0")]).is_err());
        assert!(load(&[(JWT_SECRET_KEY, "s"), (BCRYPT_COST, "2")]).is_err());
    }
}
