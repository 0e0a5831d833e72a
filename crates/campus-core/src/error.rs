//! # Error Types — Shared Validation Errors
//!
//! Field-shape validation errors used across the workspace. All errors
//! use `thiserror` for derive-based `Display` and `Error`
//! implementations. Domain crates define their own error enums for
//! business-rule rejections; this type covers only input shape.

use thiserror::Error;

/// A field failed shape validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty or whitespace.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Email address does not look like an email address.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// Phone number is not 9 or 10 digits.
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    /// Zipcode is not 4 to 6 digits.
    #[error("invalid zipcode: {0}")]
    InvalidZipcode(String),

    /// Timestamp string could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Identifier string could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
