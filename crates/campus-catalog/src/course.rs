//! # Courses
//!
//! A course is published by one or more instructors; the first listed
//! instructor is the lead and carries edit authority. Grants elsewhere
//! in the system reference courses by [`CourseId`] only.

use campus_accounts::AccountType;
use campus_core::{AccountId, CategoryId, CourseId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Course construction failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CourseError {
    /// A course must list at least one instructor.
    #[error("a course requires at least one instructor")]
    NoInstructor,

    /// Name or description was empty.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// A published course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    /// Price in minor currency units (e.g. cents). Never a float.
    pub price_cents: u64,
    pub description: String,
    /// Relative URL of the stored course image, set after upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Ordered list of instructors; the first is the lead.
    pub instructors: Vec<AccountId>,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
    /// Whether the course is featured on the landing page.
    #[serde(default)]
    pub featured: bool,
}

impl Course {
    /// Create a validated course.
    ///
    /// # Errors
    ///
    /// Rejects empty names/descriptions and an empty instructor list.
    pub fn new(
        name: impl Into<String>,
        price_cents: u64,
        description: impl Into<String>,
        instructors: Vec<AccountId>,
        categories: Vec<CategoryId>,
    ) -> Result<Self, CourseError> {
        let name = name.into();
        let description = description.into();
        if name.trim().is_empty() {
            return Err(CourseError::EmptyField { field: "name" });
        }
        if description.trim().is_empty() {
            return Err(CourseError::EmptyField {
                field: "description",
            });
        }
        if instructors.is_empty() {
            return Err(CourseError::NoInstructor);
        }
        Ok(Self {
            id: CourseId::new(),
            name,
            price_cents,
            description,
            image: None,
            instructors,
            categories,
            featured: false,
        })
    }

    /// The lead instructor — the only instructor with edit authority.
    pub fn lead_instructor(&self) -> Option<AccountId> {
        self.instructors.first().copied()
    }
}

/// Whether `editor` may modify `course`.
///
/// True for the lead (first-listed) instructor and for admins. The
/// account type must come from the persisted account record fetched at
/// the time of the edit, never from a session copy: a demoted or
/// reassigned account must lose authority immediately.
pub fn can_edit(course: &Course, editor: AccountId, editor_type: AccountType) -> bool {
    editor_type == AccountType::Admin || course.lead_instructor() == Some(editor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course_with_lead(lead: AccountId) -> Course {
        Course::new(
            "Intro to Watercolor",
            4_900,
            "Twelve lessons on wet-on-wet technique.",
            vec![lead],
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn new_course_validates() {
        let lead = AccountId::new();
        let course = course_with_lead(lead);
        assert_eq!(course.lead_instructor(), Some(lead));
        assert!(!course.featured);
        assert!(course.image.is_none());
    }

    #[test]
    fn empty_name_rejected() {
        let err = Course::new("  ", 100, "desc", vec![AccountId::new()], Vec::new()).unwrap_err();
        assert_eq!(err, CourseError::EmptyField { field: "name" });
    }

    #[test]
    fn empty_description_rejected() {
        assert!(Course::new("Name", 100, "", vec![AccountId::new()], Vec::new()).is_err());
    }

    #[test]
    fn no_instructor_rejected() {
        let err = Course::new("Name", 100, "desc", Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err, CourseError::NoInstructor);
    }

    #[test]
    fn lead_instructor_can_edit() {
        let lead = AccountId::new();
        let course = course_with_lead(lead);
        assert!(can_edit(&course, lead, AccountType::Instructor));
    }

    #[test]
    fn co_instructor_cannot_edit() {
        let lead = AccountId::new();
        let co = AccountId::new();
        let mut course = course_with_lead(lead);
        course.instructors.push(co);
        assert!(!can_edit(&course, co, AccountType::Instructor));
    }

    #[test]
    fn admin_can_edit_any_course() {
        let course = course_with_lead(AccountId::new());
        assert!(can_edit(&course, AccountId::new(), AccountType::Admin));
    }

    #[test]
    fn learner_cannot_edit() {
        let course = course_with_lead(AccountId::new());
        assert!(!can_edit(&course, AccountId::new(), AccountType::Learner));
    }

    #[test]
    fn course_serde_roundtrip() {
        let course = course_with_lead(AccountId::new());
        let json = serde_json::to_string(&course).unwrap();
        let parsed: Course = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, course);
    }
}
