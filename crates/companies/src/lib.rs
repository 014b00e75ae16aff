//! `firmreg-companies` — the company resource and its update rules.

pub mod company;
pub mod patch;

pub use company::{
    Company, CompanyKind, CreateCompany, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MIN_EMPLOYEES, NewCompany,
};
pub use patch::{CompanyChange, CompanyPatch, UpdateCompanyRequest, ValidationError};
