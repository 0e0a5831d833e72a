//! # campus-accounts — Account Domain
//!
//! Profiles for the three account types (learner, instructor, admin),
//! the field validation the registration form used to duplicate on the
//! client, and the password-reset token lifecycle.
//!
//! Password *hashing* is deliberately not here: accounts store an opaque
//! credential hash produced by an external capability, and resetting a
//! password means swapping that opaque value after a valid token is
//! presented.

pub mod account;
pub mod reset;

pub use account::{AccountProfile, AccountType};
pub use reset::{PasswordResetToken, ResetError, RESET_TOKEN_VALIDITY_SECS};
