//! `firmreg-core` — shared domain building blocks.
//!
//! Pure types only: no HTTP, no storage.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, UserId};
