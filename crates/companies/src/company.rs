use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use firmreg_core::{CompanyId, DomainError, DomainResult};

use crate::patch::{CompanyChange, CompanyPatch, ValidationError, check_description, check_employees};

pub const MAX_NAME_LEN: usize = 15;
pub const MAX_DESCRIPTION_LEN: usize = 3000;
pub const MIN_EMPLOYEES: i32 = 1;

/// Legal form of a company. Mirrors the `company_type` enum in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanyKind {
    Corporations,
    NonProfit,
    Cooperative,
    #[serde(rename = "Sole Proprietorship")]
    SoleProprietorship,
}

impl CompanyKind {
    pub const ALL: [CompanyKind; 4] = [
        CompanyKind::Corporations,
        CompanyKind::NonProfit,
        CompanyKind::Cooperative,
        CompanyKind::SoleProprietorship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyKind::Corporations => "Corporations",
            CompanyKind::NonProfit => "NonProfit",
            CompanyKind::Cooperative => "Cooperative",
            CompanyKind::SoleProprietorship => "Sole Proprietorship",
        }
    }
}

impl FromStr for CompanyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompanyKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "type must be one of: Corporations, NonProfit, Cooperative, Sole Proprietorship (got '{s}')"
                ))
            })
    }
}

impl core::fmt::Display for CompanyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ValidationError> for DomainError {
    fn from(value: ValidationError) -> Self {
        DomainError::Validation(value.to_string())
    }
}

/// Stored company record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub description: String,
    pub amount_of_employees: i32,
    pub registered: bool,
    #[serde(rename = "type")]
    pub kind: CompanyKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Apply a validated patch.
    ///
    /// The `type` value is checked against [`CompanyKind`] before any field
    /// is touched, so a rejected patch leaves the record unchanged.
    pub fn apply(&mut self, patch: &CompanyPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let kind = patch.kind().map(CompanyKind::from_str).transpose()?;

        for change in patch.changes() {
            match change {
                CompanyChange::Description(v) => self.description = v.clone(),
                CompanyChange::AmountOfEmployees(v) => self.amount_of_employees = *v,
                CompanyChange::Registered(v) => self.registered = *v,
                CompanyChange::Kind(_) => {}
            }
        }
        if let Some(kind) = kind {
            self.kind = kind;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Command: create a company (raw, as bound from the request body).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateCompany {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub amount_of_employees: i32,
    pub registered: bool,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A create command that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,
    pub description: String,
    pub amount_of_employees: i32,
    pub registered: bool,
    pub kind: CompanyKind,
}

impl CreateCompany {
    pub fn validate(self) -> DomainResult<NewCompany> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        check_description(&self.description)?;
        check_employees(self.amount_of_employees)?;
        let kind = self.kind.parse::<CompanyKind>()?;

        Ok(NewCompany {
            name,
            description: self.description,
            amount_of_employees: self.amount_of_employees,
            registered: self.registered,
            kind,
        })
    }
}

impl NewCompany {
    pub fn into_company(self, now: DateTime<Utc>) -> Company {
        Company {
            id: CompanyId::new(),
            name: self.name,
            description: self.description,
            amount_of_employees: self.amount_of_employees,
            registered: self.registered,
            kind: self.kind,
            created_at: now,
            updated_at: now,
        }
    }
}
