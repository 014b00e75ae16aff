//! Infrastructure layer: storage adapters and database wiring.

pub mod db;
pub mod store;

pub use store::{
    CompanyStore, InMemoryCompanyStore, InMemoryUserStore, PostgresCompanyStore, PostgresUserStore,
    StoreError, UserStore,
};
