//! # Accounts API
//!
//! Registration, account lookup, the per-account grant overview, and
//! the password-reset flow.
//!
//! ## Endpoints
//!
//! - `POST /v1/accounts` — register (public)
//! - `GET /v1/accounts/:id` — get account (self or admin)
//! - `GET /v1/accounts/:id/grants` — grant overview (self or admin)
//! - `POST /v1/password-reset/request` — issue a reset token (public)
//! - `POST /v1/password-reset/complete` — redeem a reset token (public)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use campus_accounts::{AccountProfile, AccountType, PasswordResetToken, ResetError};
use campus_core::{AccountId, CourseId, Timestamp};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AccountRecord, AppState};

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to register a new account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterAccountRequest {
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub zipcode: String,
    pub country: String,
    /// "Learner", "Instructor", or "Admin".
    #[schema(value_type = String)]
    pub account_type: AccountType,
    /// Opaque password hash produced by the client-side KDF.
    pub credential_hash: String,
    /// Instructor-only; discarded for other account types.
    #[serde(default)]
    pub school_name: Option<String>,
    /// Instructor-only; discarded for other account types.
    #[serde(default)]
    pub job_title: Option<String>,
    /// Instructor-only; discarded for other account types.
    #[serde(default)]
    pub specializations: Vec<String>,
}

impl Validate for RegisterAccountRequest {
    fn validate(&self) -> Result<(), String> {
        if self.credential_hash.trim().is_empty() {
            return Err("credential_hash must not be empty".to_string());
        }
        Ok(())
    }
}

impl RegisterAccountRequest {
    /// Build the stored profile, dropping instructor-only fields for
    /// non-instructor registrations.
    fn into_profile(self) -> AccountProfile {
        let is_instructor = self.account_type == AccountType::Instructor;
        AccountProfile {
            email: self.email,
            phone: self.phone,
            first_name: self.first_name,
            last_name: self.last_name,
            address: self.address,
            city: self.city,
            zipcode: self.zipcode,
            country: self.country,
            account_type: self.account_type,
            profile_picture: None,
            school_name: if is_instructor { self.school_name } else { None },
            job_title: if is_instructor { self.job_title } else { None },
            specializations: if is_instructor {
                self.specializations
            } else {
                Vec::new()
            },
            featured: false,
        }
    }
}

/// A trial grant with its access flag evaluated at request time.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrialStatus {
    #[schema(value_type = String)]
    pub course_id: CourseId,
    #[schema(value_type = String)]
    pub trial_end_date: Timestamp,
    /// Whether the trial still confers access right now.
    pub active: bool,
}

/// An enrollment grant with its access flag evaluated at request time.
#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollmentStatus {
    #[schema(value_type = String)]
    pub course_id: CourseId,
    #[schema(value_type = String)]
    pub start_date: Timestamp,
    /// Absent for permanent grants.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub end_date: Option<Timestamp>,
    pub permanent: bool,
    /// Whether the enrollment still confers access right now.
    pub active: bool,
}

/// Grant overview for one account. Expiry is evaluated when the
/// overview is built; nothing in the stored book is mutated.
#[derive(Debug, Serialize, ToSchema)]
pub struct GrantsResponse {
    #[schema(value_type = String)]
    pub account_id: AccountId,
    pub trials: Vec<TrialStatus>,
    pub enrollments: Vec<EnrollmentStatus>,
}

/// Request to start the password-reset flow.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetRequestBody {
    pub email: String,
}

impl Validate for ResetRequestBody {
    fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() {
            return Err("email must not be empty".to_string());
        }
        Ok(())
    }
}

/// The issued reset token. Returned directly; delivery is the
/// deployment's concern.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResetTokenResponse {
    pub token: String,
    #[schema(value_type = String)]
    pub expires_at: Timestamp,
}

/// Request to redeem a reset token.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetCompleteBody {
    pub email: String,
    pub token: String,
    /// Replacement password hash.
    pub new_credential_hash: String,
}

impl Validate for ResetCompleteBody {
    fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() {
            return Err("email must not be empty".to_string());
        }
        if self.token.trim().is_empty() {
            return Err("token must not be empty".to_string());
        }
        if self.new_credential_hash.trim().is_empty() {
            return Err("new_credential_hash must not be empty".to_string());
        }
        Ok(())
    }
}

// ── Routers ─────────────────────────────────────────────────────────

/// Routes reachable without authentication.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/v1/accounts", post(register_account))
        .route("/v1/password-reset/request", post(request_password_reset))
        .route(
            "/v1/password-reset/complete",
            post(complete_password_reset),
        )
}

/// Routes behind the auth middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/accounts/:id", get(get_account))
        .route("/v1/accounts/:id/grants", get(get_grants))
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Resolve the caller's persisted record. Tokens for deleted accounts
/// stop working here.
pub(crate) fn resolve_caller(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<AccountRecord, AppError> {
    state
        .accounts
        .get(caller.account_id.as_uuid())
        .ok_or_else(|| AppError::Unauthorized("account for bearer token not found".into()))
}

/// The caller may see an account's data if it is their own or they are
/// an admin, per the caller's persisted record.
fn require_self_or_admin(caller: &AccountRecord, target: AccountId) -> Result<(), AppError> {
    if caller.id == target || caller.profile.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "only the account owner or an admin may view this".into(),
        ))
    }
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/accounts — Register a new account.
#[utoipa::path(
    post,
    path = "/v1/accounts",
    request_body = RegisterAccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountRecord),
        (status = 409, description = "Email or phone already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub async fn register_account(
    State(state): State<AppState>,
    body: Result<Json<RegisterAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let credential_hash = req.credential_hash.clone();
    let profile = req.into_profile();
    profile.validate()?;

    if state.account_by_email(&profile.email).is_some() {
        return Err(AppError::Conflict(format!(
            "email {} is already registered",
            profile.email
        )));
    }
    if state
        .accounts
        .find(|a| a.profile.phone == profile.phone)
        .is_some()
    {
        return Err(AppError::Conflict(
            "phone number is already registered".into(),
        ));
    }

    let record = AccountRecord::new(profile, credential_hash);
    state.accounts.insert(*record.id.as_uuid(), record.clone());
    tracing::info!(account_id = %record.id, account_type = %record.profile.account_type, "account registered");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/accounts/:id — Get a single account.
#[utoipa::path(
    get,
    path = "/v1/accounts/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account found", body = AccountRecord),
        (status = 403, description = "Not the owner or an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Account not found", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub async fn get_account(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountRecord>, AppError> {
    let caller_record = resolve_caller(&state, &caller)?;
    require_self_or_admin(&caller_record, AccountId(id))?;

    state
        .accounts
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("account {id} not found")))
}

/// GET /v1/accounts/:id/grants — Grant overview with live access flags.
#[utoipa::path(
    get,
    path = "/v1/accounts/{id}/grants",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Grant overview", body = GrantsResponse),
        (status = 403, description = "Not the owner or an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Account not found", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub async fn get_grants(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<GrantsResponse>, AppError> {
    let caller_record = resolve_caller(&state, &caller)?;
    require_self_or_admin(&caller_record, AccountId(id))?;

    let record = state
        .accounts
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("account {id} not found")))?;

    let now = Timestamp::now();
    let trials = record
        .grants
        .trials
        .iter()
        .map(|t| TrialStatus {
            course_id: t.course_id,
            trial_end_date: t.trial_end_date,
            active: t.is_usable(now),
        })
        .collect();
    let enrollments = record
        .grants
        .enrollments
        .iter()
        .map(|e| EnrollmentStatus {
            course_id: e.course_id,
            start_date: e.start_date,
            end_date: e.end_date,
            permanent: e.is_permanent(),
            active: e.is_active(now),
        })
        .collect();

    Ok(Json(GrantsResponse {
        account_id: record.id,
        trials,
        enrollments,
    }))
}

/// POST /v1/password-reset/request — Issue a reset token.
#[utoipa::path(
    post,
    path = "/v1/password-reset/request",
    request_body = ResetRequestBody,
    responses(
        (status = 200, description = "Token issued", body = ResetTokenResponse),
        (status = 404, description = "No account with that email", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    body: Result<Json<ResetRequestBody>, JsonRejection>,
) -> Result<Json<ResetTokenResponse>, AppError> {
    let req = extract_validated_json(body)?;

    let record = state
        .account_by_email(&req.email)
        .ok_or_else(|| AppError::NotFound("no account with that email".into()))?;

    let token = PasswordResetToken::issue(Timestamp::now());
    let response = ResetTokenResponse {
        token: token.token.clone(),
        expires_at: token.expires_at,
    };

    // Replaces any outstanding token for the account.
    state.accounts.update(record.id.as_uuid(), |a| {
        a.reset_token = Some(token);
        a.updated_at = Timestamp::now();
    });
    tracing::info!(account_id = %record.id, "password reset token issued");

    Ok(Json(response))
}

/// POST /v1/password-reset/complete — Redeem a reset token.
#[utoipa::path(
    post,
    path = "/v1/password-reset/complete",
    request_body = ResetCompleteBody,
    responses(
        (status = 204, description = "Password replaced"),
        (status = 404, description = "No account with that email", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid or expired token", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub async fn complete_password_reset(
    State(state): State<AppState>,
    body: Result<Json<ResetCompleteBody>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let req = extract_validated_json(body)?;

    let record = state
        .account_by_email(&req.email)
        .ok_or_else(|| AppError::NotFound("no account with that email".into()))?;

    let now = Timestamp::now();
    // Check-and-consume under one write lock so the token is single-use
    // even under concurrent redemption attempts.
    let result = state
        .accounts
        .try_update(record.id.as_uuid(), |a| match &a.reset_token {
            Some(t) if t.matches(&req.token, now) => {
                a.credential_hash = req.new_credential_hash.clone();
                a.reset_token = None;
                a.updated_at = now;
                Ok(())
            }
            _ => Err(ResetError::InvalidOrExpiredToken),
        })
        .ok_or_else(|| AppError::NotFound("no account with that email".into()))?;
    result?;

    tracing::info!(account_id = %record.id, "password reset completed");
    Ok(StatusCode::NO_CONTENT)
}
