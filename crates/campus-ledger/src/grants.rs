//! # Grant Records
//!
//! The two grant shapes the ledger appends to a learner's account:
//! short-lived trials and purchased enrollments (timed or permanent).
//! Both reference the course by identifier only.

use campus_core::{CourseId, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Trial access lasts exactly two days from the moment it is granted.
pub const TRIAL_PERIOD_SECS: i64 = 2 * 24 * 60 * 60;

/// Timed enrollment lasts exactly seven days from purchase.
pub const TIMED_ACCESS_PERIOD_SECS: i64 = 7 * 24 * 60 * 60;

/// The trial window as a `chrono::Duration`.
pub fn trial_period() -> Duration {
    Duration::seconds(TRIAL_PERIOD_SECS)
}

/// The timed-access window as a `chrono::Duration`.
pub fn timed_access_period() -> Duration {
    Duration::seconds(TIMED_ACCESS_PERIOD_SECS)
}

// ── Access Mode ──────────────────────────────────────────────────────

/// The access mode a learner requests when purchasing a course.
///
/// This enum is exhaustive on the wire: serde rejects anything other
/// than `"7-days"` and `"permanent"` at deserialization, and
/// [`AccessMode::parse`] rejects it with a named ledger error. There is
/// no silent fallback for unrecognized modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    /// Seven days of access from the purchase time.
    #[serde(rename = "7-days")]
    SevenDays,
    /// Access with no expiry.
    #[serde(rename = "permanent")]
    Permanent,
}

impl AccessMode {
    /// The wire name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SevenDays => "7-days",
            Self::Permanent => "permanent",
        }
    }

    /// Parse a wire-format mode string.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAccessMode`] for anything other
    /// than the two supported modes.
    ///
    /// [`LedgerError::InvalidAccessMode`]: crate::book::LedgerError::InvalidAccessMode
    pub fn parse(s: &str) -> Result<Self, crate::book::LedgerError> {
        match s {
            "7-days" => Ok(Self::SevenDays),
            "permanent" => Ok(Self::Permanent),
            other => Err(crate::book::LedgerError::InvalidAccessMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Trial Grant ──────────────────────────────────────────────────────

/// A one-time, two-day trial grant for a course.
///
/// Created at most once per (learner, course) pair, ever. The grant is
/// never removed or overwritten; it ends implicitly when
/// `trial_end_date` passes, and expiry is evaluated lazily wherever the
/// grant is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialGrant {
    /// The course this trial covers.
    pub course_id: CourseId,
    /// When the trial window closes.
    pub trial_end_date: Timestamp,
    /// Whether the grant is administratively active. Defaults to true;
    /// expiry is a separate, time-based condition.
    pub active: bool,
}

impl TrialGrant {
    /// Whether the trial window has passed as of `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.trial_end_date
    }

    /// Whether the trial currently confers access.
    pub fn is_usable(&self, now: Timestamp) -> bool {
        self.active && !self.is_expired(now)
    }
}

// ── Enrollment Grant ─────────────────────────────────────────────────

/// A purchased access grant, either timed (seven days) or permanent.
///
/// `end_date` absent means the grant never expires. A learner may hold
/// both a permanent grant and an earlier timed grant for the same
/// course; the ledger never merges or deduplicates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentGrant {
    /// The course this enrollment covers.
    pub course_id: CourseId,
    /// When access began.
    pub start_date: Timestamp,
    /// When access ends; absent for permanent enrollment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Timestamp>,
}

impl EnrollmentGrant {
    /// Whether this grant has no expiry.
    pub fn is_permanent(&self) -> bool {
        self.end_date.is_none()
    }

    /// Whether a timed grant's window has passed as of `now`.
    /// Permanent grants never expire.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        match self.end_date {
            Some(end) => now > end,
            None => false,
        }
    }

    /// Whether the grant confers access as of `now`.
    pub fn is_active(&self, now: Timestamp) -> bool {
        !self.is_expired(now)
    }
}
