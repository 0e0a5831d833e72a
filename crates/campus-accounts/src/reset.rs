//! # Password-Reset Tokens
//!
//! Short-lived, single-use tokens for the forgot-password flow. A token
//! is 32 bytes of OS randomness rendered as hex, valid for one hour.
//! Expiry is evaluated lazily when the token is presented; issuing a new
//! token replaces any outstanding one.
//!
//! Delivery is an external concern — the caller decides whether the
//! token travels by email or is surfaced directly.

use campus_core::Timestamp;
use chrono::Duration;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reset tokens stay valid for one hour.
pub const RESET_TOKEN_VALIDITY_SECS: i64 = 60 * 60;

/// The reset flow failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResetError {
    /// The presented token does not match or has expired.
    #[error("invalid or expired password reset token")]
    InvalidOrExpiredToken,
}

/// An outstanding password-reset token for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetToken {
    /// 64 hex characters of OS randomness.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: Timestamp,
}

impl PasswordResetToken {
    /// Issue a fresh token valid for [`RESET_TOKEN_VALIDITY_SECS`] from `now`.
    pub fn issue(now: Timestamp) -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self {
            token: to_hex(&bytes),
            expires_at: now.saturating_add(Duration::seconds(RESET_TOKEN_VALIDITY_SECS)),
        }
    }

    /// Whether the presented token matches and has not expired as of `now`.
    pub fn matches(&self, presented: &str, now: Timestamp) -> bool {
        now <= self.expires_at && self.token == presented
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, b| {
            use std::fmt::Write;
            // Writing to a String cannot fail.
            let _ = write!(out, "{b:02x}");
            out
        },
    )
}
