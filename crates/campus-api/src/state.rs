//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! AppState holds three stores:
//! - **Accounts** — learner/instructor/admin records, each carrying its
//!   own grant book and (optionally) an outstanding password-reset token
//! - **Courses** — published catalog records
//! - **Categories** — flat category records with derived slugs
//!
//! Grant mutations (trial start, purchase) go through [`Store::try_update`]
//! so the precondition check and the append happen under one write lock.

use std::collections::HashMap;
use std::sync::Arc;

use campus_accounts::{AccountProfile, PasswordResetToken};
use campus_catalog::{Category, Course};
use campus_core::{AccountId, CategoryId, CourseId, Timestamp};
use campus_ledger::GrantBook;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not `tokio::sync`)
/// because we never hold the lock across `.await` points. `parking_lot::RwLock`
/// is non-poisonable — a panicking writer does not permanently corrupt the store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Find the first record matching the predicate.
    ///
    /// Iteration order is unspecified; callers use this for lookups where
    /// at most one record can match (e.g. unique email).
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.data.read().values().find(|v| pred(v)).cloned()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure receives a `&mut T` and may inspect the current state,
    /// validate preconditions, mutate the record, and return `Ok(R)` or
    /// `Err(E)`. The entire operation runs under a single write lock,
    /// eliminating TOCTOU races between read and update.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Remove a record by ID.
    #[allow(dead_code)]
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Record Types -------------------------------------------------------------

/// Account record (API-layer representation).
///
/// The grant book lives inside the account record so a trial or purchase
/// is a single-record mutation: one `try_update` call validates against
/// the current book and appends to it atomically.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountRecord {
    #[schema(value_type = String)]
    pub id: AccountId,
    #[schema(value_type = Object)]
    pub profile: AccountProfile,
    /// Opaque password hash produced by the caller's KDF. Never logged,
    /// never serialized into API responses.
    #[serde(skip_serializing, default)]
    pub credential_hash: String,
    /// Trial and enrollment ledger for this account.
    #[schema(value_type = Object)]
    pub grants: GrantBook,
    /// Outstanding password-reset token, if one was requested. Cleared
    /// on successful reset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub reset_token: Option<PasswordResetToken>,
    #[schema(value_type = String)]
    pub created_at: Timestamp,
    #[schema(value_type = String)]
    pub updated_at: Timestamp,
}

impl AccountRecord {
    /// Create a fresh record with an empty grant book.
    pub fn new(profile: AccountProfile, credential_hash: String) -> Self {
        let now = Timestamp::now();
        Self {
            id: AccountId::new(),
            profile,
            credential_hash,
            grants: GrantBook::new(),
            reset_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Course record (API-layer representation).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseRecord {
    #[schema(value_type = Object)]
    pub course: Course,
    #[schema(value_type = String)]
    pub created_at: Timestamp,
    #[schema(value_type = String)]
    pub updated_at: Timestamp,
}

impl CourseRecord {
    pub fn new(course: Course) -> Self {
        let now = Timestamp::now();
        Self {
            course,
            created_at: now,
            updated_at: now,
        }
    }
}

// -- Application State --------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token appended to the account id in the
    /// `Authorization` header. If `None`, callers authenticate with the
    /// bare account id (development mode).
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in each `Store`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub accounts: Store<AccountRecord>,
    pub courses: Store<CourseRecord>,
    pub categories: Store<Category>,
    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new application state with the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            accounts: Store::new(),
            courses: Store::new(),
            categories: Store::new(),
            config,
        }
    }

    /// Look up an account by email (unique across the store).
    pub fn account_by_email(&self, email: &str) -> Option<AccountRecord> {
        self.accounts.find(|a| a.profile.email == email)
    }

    /// Look up a course record.
    pub fn course(&self, id: CourseId) -> Option<CourseRecord> {
        self.courses.get(id.as_uuid())
    }

    /// Look up a category by slug.
    pub fn category_by_slug(&self, slug: &str) -> Option<Category> {
        self.categories.find(|c| c.slug == slug)
    }

    /// Whether a category id refers to a stored category.
    pub fn category_exists(&self, id: CategoryId) -> bool {
        self.categories.contains(id.as_uuid())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
