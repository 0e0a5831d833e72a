//! # campus-core — Foundational Types for Campus
//!
//! The leaf crate of the Campus workspace. Defines the primitives every
//! other crate builds on: identifier newtypes, the UTC-only `Timestamp`,
//! and the shared validation error type.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `AccountId`,
//!    `CourseId`, `CategoryId` — you cannot hand a course identifier to
//!    an API that expects an account. No bare `Uuid`s cross crate
//!    boundaries.
//!
//! 2. **UTC-only timestamps, seconds precision.** Every grant expiry
//!    comparison in the system goes through [`Timestamp`]; local offsets
//!    and sub-second noise never enter stored records.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `campus-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::ValidationError;
pub use identity::{AccountId, CategoryId, CourseId};
pub use temporal::Timestamp;
