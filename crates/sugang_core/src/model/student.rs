//! Student record.

use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Storage-assigned student identifier.
pub type StudentId = i64;

/// Persisted student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub major: String,
}

/// Unsaved student built from administrative input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub major: String,
}

impl NewStudent {
    /// Creates a draft with trimmed fields. Call `validate` before persisting.
    pub fn new(name: impl Into<String>, major: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            major: major.into().trim().to_string(),
        }
    }

    /// Rejects blank `name` or `major`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("major", &self.major)
    }
}

impl Student {
    /// Attaches a storage identity to a validated draft.
    pub fn from_new(id: StudentId, draft: NewStudent) -> Self {
        Self {
            id,
            name: draft.name,
            major: draft.major,
        }
    }
}
