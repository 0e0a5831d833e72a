//! # API Route Modules
//!
//! Route modules for the Campus API surface:
//!
//! - `accounts` — registration, account lookup, the per-account grant
//!   overview, and the password-reset flow.
//! - `catalog` — course and category CRUD with lead-instructor /
//!   admin edit authority resolved from persisted records.
//! - `enrollment` — trial starts and purchases, routed through the
//!   account's grant book under a single store write lock.

pub mod accounts;
pub mod catalog;
pub mod enrollment;
