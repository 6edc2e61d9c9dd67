//! Course record.

use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Storage-assigned course identifier.
pub type CourseId = i64;

/// Persisted course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
}

/// Unsaved course built from administrative input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub title: String,
}

impl NewCourse {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }
}

impl Course {
    pub fn from_new(id: CourseId, draft: NewCourse) -> Self {
        Self {
            id,
            title: draft.title,
        }
    }
}
