//! # Account Profiles
//!
//! The profile data shared by every account, plus the instructor-only
//! fields. Validation mirrors what the registration form enforces:
//! required fields non-empty, email with a domain, phone 9–10 digits,
//! zipcode 4–6 digits.

use campus_core::ValidationError;
use serde::{Deserialize, Serialize};

// ── Account Type ─────────────────────────────────────────────────────

/// The three kinds of account in the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Browses and enrolls in courses.
    Learner,
    /// Publishes and edits courses.
    Instructor,
    /// Moderates all content.
    Admin,
}

impl AccountType {
    /// The string representation of this account type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learner => "Learner",
            Self::Instructor => "Instructor",
            Self::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Profile ──────────────────────────────────────────────────────────

/// Profile data for an account.
///
/// The instructor-only fields (`school_name`, `job_title`,
/// `specializations`, `featured`) stay unset for learners and admins;
/// registration discards them for non-instructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub zipcode: String,
    pub country: String,
    pub account_type: AccountType,
    /// Relative URL of the stored profile picture, set after upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    // Instructor-only fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specializations: Vec<String>,
    /// Whether this instructor is featured on the landing page.
    #[serde(default)]
    pub featured: bool,
}

impl AccountProfile {
    /// Validate field shapes.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered; checks run in
    /// field-declaration order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("email", &self.email)?;
        if !looks_like_email(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        if !is_digits_in_range(&self.phone, 9, 10) {
            return Err(ValidationError::InvalidPhone(self.phone.clone()));
        }
        require_non_empty("first_name", &self.first_name)?;
        require_non_empty("last_name", &self.last_name)?;
        require_non_empty("address", &self.address)?;
        require_non_empty("city", &self.city)?;
        if !is_digits_in_range(&self.zipcode, 4, 6) {
            return Err(ValidationError::InvalidZipcode(self.zipcode.clone()));
        }
        require_non_empty("country", &self.country)?;
        Ok(())
    }

    /// Whether this account may publish courses.
    pub fn is_instructor(&self) -> bool {
        self.account_type == AccountType::Instructor
    }

    /// Whether this account may moderate any content.
    pub fn is_admin(&self) -> bool {
        self.account_type == AccountType::Admin
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField { field })
    } else {
        Ok(())
    }
}

/// Minimal email shape check: something before `@`, and a dot somewhere
/// in the domain part.
fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

fn is_digits_in_range(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}
