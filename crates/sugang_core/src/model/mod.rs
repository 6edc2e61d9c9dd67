//! Domain records for the registration core.
//!
//! # Responsibility
//! - Define the student, course, and enrollment shapes used by services.
//! - Keep construction and validation rules next to the data they guard.
//!
//! # Invariants
//! - Identifiers are storage-assigned integers and never reused.
//! - An enrollment is never mutated after creation.

pub mod course;
pub mod enrollment;
pub mod student;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for catalog records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is blank after trimming.
    BlankField(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}
