//! Shared application services, built once at startup.

use std::sync::Arc;

use anyhow::Context;

use firmreg_auth::{AuthorizationGate, BcryptHasher, PasswordHasher, SigningKey, TokenService};
use firmreg_infra::{
    CompanyStore, InMemoryCompanyStore, InMemoryUserStore, PostgresCompanyStore, PostgresUserStore,
    UserStore, db,
};

use crate::config::AppConfig;
use crate::rate_limit::{RateLimitConfig, RateLimiter};

#[derive(Clone)]
pub struct AppServices {
    pub companies: Arc<dyn CompanyStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: TokenService,
    pub gate: AuthorizationGate,
    pub hasher: Arc<dyn PasswordHasher>,
    pub limiter: Arc<RateLimiter>,
}

impl AppServices {
    pub fn new(
        companies: Arc<dyn CompanyStore>,
        users: Arc<dyn UserStore>,
        signing_key: &SigningKey,
        hasher: Arc<dyn PasswordHasher>,
        rate_limit: RateLimitConfig,
    ) -> Self {
        let tokens = TokenService::hs256(signing_key);
        Self {
            companies,
            users,
            gate: AuthorizationGate::new(tokens.clone()),
            tokens,
            hasher,
            limiter: Arc::new(RateLimiter::new(rate_limit)),
        }
    }

    /// Services backed by process-local stores (tests, local runs).
    pub fn in_memory(signing_key: &SigningKey, rate_limit: RateLimitConfig, bcrypt_cost: u32) -> Self {
        Self::new(
            Arc::new(InMemoryCompanyStore::new()),
            Arc::new(InMemoryUserStore::new()),
            signing_key,
            Arc::new(BcryptHasher::new(bcrypt_cost)),
            rate_limit,
        )
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let Some(url) = config.database_url.as_deref() else {
            tracing::warn!("no database configured; using in-memory storage (data is lost on restart)");
            return Ok(Self::in_memory(&config.signing_key, config.rate_limit, config.bcrypt_cost));
        };

        let pool = db::connect(url).await.context("connecting to database")?;
        db::ensure_schema(&pool).await.context("preparing database schema")?;
        tracing::info!("using PostgreSQL storage");

        Ok(Self::new(
            Arc::new(PostgresCompanyStore::new(pool.clone())),
            Arc::new(PostgresUserStore::new(pool)),
            &config.signing_key,
            Arc::new(BcryptHasher::new(config.bcrypt_cost)),
            config.rate_limit,
        ))
    }
}
