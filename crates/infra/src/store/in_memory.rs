use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use firmreg_auth::User;
use firmreg_companies::{Company, CompanyPatch, NewCompany};
use firmreg_core::CompanyId;

use super::{CompanyStore, StoreError, UserStore};

/// In-memory company store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCompanyStore {
    inner: RwLock<HashMap<CompanyId, Company>>,
}

impl InMemoryCompanyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompanyStore for InMemoryCompanyStore {
    async fn create(&self, company: NewCompany) -> Result<Company, StoreError> {
        let mut map = self.inner.write();
        if map.values().any(|c| c.name == company.name) {
            return Err(StoreError::Conflict(format!("company name '{}' is taken", company.name)));
        }
        let company = company.into_company(Utc::now());
        map.insert(company.id, company.clone());
        Ok(company)
    }

    async fn get(&self, id: CompanyId) -> Result<Company, StoreError> {
        self.inner.read().get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: CompanyId, patch: &CompanyPatch) -> Result<Company, StoreError> {
        let mut map = self.inner.write();
        let current = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        current.apply(patch, Utc::now())?;
        Ok(current.clone())
    }

    async fn delete(&self, id: CompanyId) -> Result<(), StoreError> {
        self.inner
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

/// In-memory user store for tests/dev, keyed by username.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut map = self.inner.write();
        if map.contains_key(&user.username) {
            return Err(StoreError::Conflict(format!("username '{}' is taken", user.username)));
        }
        map.insert(user.username.clone(), user);
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().get(username).cloned())
    }
}
