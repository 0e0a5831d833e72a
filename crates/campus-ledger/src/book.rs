//! # Grant Book — Per-Learner Grant Collections
//!
//! The [`GrantBook`] is the learner-owned record the ledger operates on:
//! an unordered collection of trial grants and an unordered collection
//! of enrollment grants, embedded in the account record and persisted as
//! a whole. The mutating operations here are check-then-append and
//! all-or-nothing: a rejection leaves the book untouched.
//!
//! ## Duplicate rules
//!
//! - At most one trial per course, ever. Expired and inactive trials
//!   still block a second trial.
//! - At most one permanent enrollment per course. A permanent grant
//!   blocks every further purchase of that course, timed or permanent.
//! - At most one timed enrollment per course, ever. An expired timed
//!   grant still blocks a new timed purchase; the only way to regain
//!   access afterwards is a permanent purchase. (One timed purchase per
//!   course per learner is policy, not an expiry bug.)

use campus_core::{CourseId, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grants::{timed_access_period, trial_period, AccessMode, EnrollmentGrant, TrialGrant};

// ── Errors ───────────────────────────────────────────────────────────

/// Business-rule rejections issued by the ledger.
///
/// These are expected, user-facing conditions. They are never retried
/// and never leave partial state behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The learner has already trialed this course.
    #[error("course {course_id} has already been trialed")]
    AlreadyTrialed {
        /// The course the trial was requested for.
        course_id: CourseId,
    },

    /// The learner already holds a permanent enrollment for this course.
    #[error("already permanently enrolled in course {course_id}")]
    AlreadyPermanentlyEnrolled {
        /// The course the purchase was requested for.
        course_id: CourseId,
    },

    /// The learner has already purchased timed access for this course.
    #[error("a timed enrollment for course {course_id} already exists")]
    DuplicateTimedEnrollment {
        /// The course the purchase was requested for.
        course_id: CourseId,
    },

    /// The requested access mode is not one of the supported modes.
    #[error("unsupported access mode {mode:?}; expected \"7-days\" or \"permanent\"")]
    InvalidAccessMode {
        /// The rejected mode string.
        mode: String,
    },
}

// ── Grant Book ───────────────────────────────────────────────────────

/// A learner's grant collections.
///
/// Owned by the account record; courses are referenced by identifier
/// only. Both collections are append-only and order-irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantBook {
    /// Trial grants, at most one per course.
    #[serde(default)]
    pub trials: Vec<TrialGrant>,
    /// Enrollment grants. A course may appear twice: once timed, once
    /// permanent.
    #[serde(default)]
    pub enrollments: Vec<EnrollmentGrant>,
}

impl GrantBook {
    /// An empty grant book.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Begin a two-day trial for `course_id`.
    ///
    /// Rejects with [`LedgerError::AlreadyTrialed`] if any trial for the
    /// course exists, regardless of its active flag or expiry. On
    /// success, appends the grant and returns a copy for display; the
    /// book retains the authoritative record.
    pub fn begin_trial(
        &mut self,
        course_id: CourseId,
        now: Timestamp,
    ) -> Result<TrialGrant, LedgerError> {
        if self.has_trialed(course_id) {
            return Err(LedgerError::AlreadyTrialed { course_id });
        }

        let grant = TrialGrant {
            course_id,
            trial_end_date: now.saturating_add(trial_period()),
            active: true,
        };
        self.trials.push(grant.clone());
        Ok(grant)
    }

    /// Purchase access to `course_id` in the requested mode.
    ///
    /// A permanent grant for the course rejects every purchase with
    /// [`LedgerError::AlreadyPermanentlyEnrolled`], checked before the
    /// mode branches. A timed purchase additionally rejects with
    /// [`LedgerError::DuplicateTimedEnrollment`] when any timed grant
    /// for the course exists, expired or not. A permanent purchase may
    /// coexist with an earlier timed grant.
    pub fn purchase(
        &mut self,
        course_id: CourseId,
        mode: AccessMode,
        now: Timestamp,
    ) -> Result<EnrollmentGrant, LedgerError> {
        if self.has_permanent(course_id) {
            return Err(LedgerError::AlreadyPermanentlyEnrolled { course_id });
        }

        let grant = match mode {
            AccessMode::SevenDays => {
                if self.has_timed(course_id) {
                    return Err(LedgerError::DuplicateTimedEnrollment { course_id });
                }
                EnrollmentGrant {
                    course_id,
                    start_date: now,
                    end_date: Some(now.saturating_add(timed_access_period())),
                }
            }
            AccessMode::Permanent => EnrollmentGrant {
                course_id,
                start_date: now,
                end_date: None,
            },
        };

        self.enrollments.push(grant.clone());
        Ok(grant)
    }

    // ── Queries (expiry evaluated lazily) ────────────────────────────

    /// Whether any trial for the course exists, in any state.
    pub fn has_trialed(&self, course_id: CourseId) -> bool {
        self.trials.iter().any(|t| t.course_id == course_id)
    }

    /// Whether a permanent enrollment for the course exists.
    pub fn has_permanent(&self, course_id: CourseId) -> bool {
        self.enrollments
            .iter()
            .any(|e| e.course_id == course_id && e.is_permanent())
    }

    /// Whether any timed enrollment for the course exists, expired or not.
    pub fn has_timed(&self, course_id: CourseId) -> bool {
        self.enrollments
            .iter()
            .any(|e| e.course_id == course_id && !e.is_permanent())
    }

    /// The trial grant for a course, if one was ever created.
    pub fn trial_for(&self, course_id: CourseId) -> Option<&TrialGrant> {
        self.trials.iter().find(|t| t.course_id == course_id)
    }

    /// Enrollments that confer access as of `now`.
    pub fn active_enrollments(&self, now: Timestamp) -> Vec<&EnrollmentGrant> {
        self.enrollments
            .iter()
            .filter(|e| e.is_active(now))
            .collect()
    }

    /// Trials that confer access as of `now`.
    pub fn active_trials(&self, now: Timestamp) -> Vec<&TrialGrant> {
        self.trials.iter().filter(|t| t.is_usable(now)).collect()
    }

    /// Whether the learner may access the course content as of `now`,
    /// through any grant.
    pub fn can_access(&self, course_id: CourseId, now: Timestamp) -> bool {
        self.enrollments
            .iter()
            .any(|e| e.course_id == course_id && e.is_active(now))
            || self
                .trials
                .iter()
                .any(|t| t.course_id == course_id && t.is_usable(now))
    }
}
