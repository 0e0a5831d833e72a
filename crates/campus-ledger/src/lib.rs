//! # campus-ledger — Enrollment Ledger
//!
//! Decides whether a learner may begin a trial or purchase access to a
//! course, and records the resulting grant with its validity window.
//! The ledger is pure domain logic: it mutates a [`GrantBook`] owned by
//! the learner's account record and leaves persistence to the caller.
//!
//! ## Grant tracks
//!
//! Each (learner, course) pair moves along two independent tracks:
//!
//! ```text
//! trial:       NoTrial ──▶ Trialed                 (terminal)
//!
//! enrollment:  NoAccess ──▶ TimedAccess ──▶ ∅      (further timed blocked)
//!              NoAccess ──▶ PermanentAccess        (terminal)
//!              TimedAccess ──▶ PermanentAccess     (both grants coexist)
//! ```
//!
//! A rejected operation never mutates the book. Expiry is evaluated
//! lazily wherever a grant is read; nothing sweeps expired grants.
//!
//! ## Concurrency
//!
//! The check-then-append operations here are only safe when the whole
//! read-validate-mutate sequence runs atomically against the stored
//! account. Callers must wrap them in the store's conditional-update
//! primitive; see `campus-api`.

pub mod book;
pub mod grants;

pub use book::{GrantBook, LedgerError};
pub use grants::{
    timed_access_period, trial_period, AccessMode, EnrollmentGrant, TrialGrant,
    TIMED_ACCESS_PERIOD_SECS, TRIAL_PERIOD_SECS,
};
