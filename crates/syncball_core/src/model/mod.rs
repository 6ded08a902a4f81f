//! Sports-competition domain model.
//!
//! # Responsibility
//! - Define plain entity records persisted by the repository layer.
//! - Check field-level invariants (required fields, length limits, ids).
//!
//! # Invariants
//! - Entities carry foreign-key scalars only; the "other side" of a
//!   relationship is resolved by an explicit repository lookup.
//! - `last_updated` is refreshed by repository mutations, not by callers.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod country;
pub mod fixture;
pub mod league;
pub mod season;
pub mod system;
pub mod team;
pub mod venue;

/// Surrogate integer identity shared by every table.
pub type EntityId = i64;

/// Field-level invariant violation detected before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Required text field is empty.
    Required {
        entity: &'static str,
        field: &'static str,
    },
    /// Text field exceeds its column length (counted in chars).
    TooLong {
        entity: &'static str,
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Identity or foreign key must be a positive value.
    InvalidId {
        entity: &'static str,
        field: &'static str,
        value: EntityId,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required { entity, field } => write!(f, "{entity}.{field} is required"),
            Self::TooLong {
                entity,
                field,
                max,
                actual,
            } => write!(
                f,
                "{entity}.{field} exceeds {max} chars (got {actual})"
            ),
            Self::InvalidId {
                entity,
                field,
                value,
            } => write!(f, "{entity}.{field} must be positive, got {value}"),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) type ValidationResult = Result<(), ModelValidationError>;

pub(crate) fn required(entity: &'static str, field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ModelValidationError::Required { entity, field });
    }
    Ok(())
}

pub(crate) fn max_len(
    entity: &'static str,
    field: &'static str,
    value: &str,
    max: usize,
) -> ValidationResult {
    let actual = value.chars().count();
    if actual > max {
        return Err(ModelValidationError::TooLong {
            entity,
            field,
            max,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn max_len_opt(
    entity: &'static str,
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult {
    value.map_or(Ok(()), |value| max_len(entity, field, value, max))
}

pub(crate) fn positive_id(
    entity: &'static str,
    field: &'static str,
    value: EntityId,
) -> ValidationResult {
    if value <= 0 {
        return Err(ModelValidationError::InvalidId {
            entity,
            field,
            value,
        });
    }
    Ok(())
}
