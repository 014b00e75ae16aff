//! Storage abstractions for companies and user accounts.
//!
//! Handlers only see the traits; `main` picks the in-memory or PostgreSQL
//! adapters at startup.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use firmreg_auth::User;
use firmreg_companies::{Company, CompanyPatch, NewCompany};
use firmreg_core::{CompanyId, DomainError};

pub use in_memory::{InMemoryCompanyStore, InMemoryUserStore};
pub use postgres::{PostgresCompanyStore, PostgresUserStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    /// Uniqueness violation (company name, username).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The stored vocabulary rejected a value (e.g. an unknown company type).
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn create(&self, company: NewCompany) -> Result<Company, StoreError>;

    async fn get(&self, id: CompanyId) -> Result<Company, StoreError>;

    /// Apply a validated patch and return the updated record.
    async fn update(&self, id: CompanyId, patch: &CompanyPatch) -> Result<Company, StoreError>;

    async fn delete(&self, id: CompanyId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
}
