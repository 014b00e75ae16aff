//! Sparse partial-update merging.
//!
//! A PATCH body is bound into [`UpdateCompanyRequest`], where every field is
//! optional so "absent" and "present with a zero value" stay distinct. The
//! merger turns it into a [`CompanyPatch`] holding only the fields the client
//! sent, each already checked against its constraint.

use serde::Deserialize;
use thiserror::Error;

use crate::company::{MAX_DESCRIPTION_LEN, MIN_EMPLOYEES};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no fields requested for update")]
    EmptyPatch,

    #[error("{field} must be at most {max} characters (got {actual})")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} must be at least {min} (got {actual})")]
    FieldBelowMinimum {
        field: &'static str,
        min: i64,
        actual: i64,
    },
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyPatch => "empty_patch",
            ValidationError::FieldTooLong { .. } => "field_too_long",
            ValidationError::FieldBelowMinimum { .. } => "field_below_minimum",
        }
    }
}

/// Partial update body. JSON `null` is treated the same as an absent field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateCompanyRequest {
    pub description: Option<String>,
    pub amount_of_employees: Option<i32>,
    pub registered: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// One accepted field-level change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyChange {
    Description(String),
    AmountOfEmployees(i32),
    Registered(bool),
    /// Checked against the closed vocabulary by the store, not here.
    Kind(String),
}

impl CompanyChange {
    /// Wire/column name of the changed field.
    pub fn field(&self) -> &'static str {
        match self {
            CompanyChange::Description(_) => "description",
            CompanyChange::AmountOfEmployees(_) => "amount_of_employees",
            CompanyChange::Registered(_) => "registered",
            CompanyChange::Kind(_) => "type",
        }
    }
}

/// Non-empty, validated set of changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyPatch {
    changes: Vec<CompanyChange>,
}

impl CompanyPatch {
    pub fn build(request: UpdateCompanyRequest) -> Result<Self, ValidationError> {
        let mut changes = Vec::with_capacity(4);

        if let Some(description) = request.description {
            check_description(&description)?;
            changes.push(CompanyChange::Description(description));
        }
        if let Some(count) = request.amount_of_employees {
            check_employees(count)?;
            changes.push(CompanyChange::AmountOfEmployees(count));
        }
        if let Some(registered) = request.registered {
            changes.push(CompanyChange::Registered(registered));
        }
        if let Some(kind) = request.kind {
            changes.push(CompanyChange::Kind(kind));
        }

        if changes.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        Ok(Self { changes })
    }

    pub fn changes(&self) -> &[CompanyChange] {
        &self.changes
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.changes.iter().map(CompanyChange::field).collect()
    }

    /// Requested `type` value, if any.
    pub fn kind(&self) -> Option<&str> {
        self.changes.iter().find_map(|c| match c {
            CompanyChange::Kind(k) => Some(k.as_str()),
            _ => None,
        })
    }
}

pub(crate) fn check_description(description: &str) -> Result<(), ValidationError> {
    let actual = description.chars().count();
    if actual > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::FieldTooLong {
            field: "description",
            max: MAX_DESCRIPTION_LEN,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn check_employees(count: i32) -> Result<(), ValidationError> {
    if count < MIN_EMPLOYEES {
        return Err(ValidationError::FieldBelowMinimum {
            field: "amount_of_employees",
            min: MIN_EMPLOYEES.into(),
            actual: count.into(),
        });
    }
    Ok(())
}
