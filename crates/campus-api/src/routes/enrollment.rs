//! # Enrollment API
//!
//! Trial starts and purchases. Both operations run the grant-book check
//! and append inside a single store write lock, so two simultaneous
//! requests for the same account serialize and the loser sees the
//! winner's grant.
//!
//! ## Endpoints
//!
//! - `POST /v1/courses/:id/trial` — start a two-day trial
//! - `POST /v1/courses/:id/order` — purchase timed or permanent access

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use campus_core::{CourseId, Timestamp};
use campus_ledger::{AccessMode, EnrollmentGrant, TrialGrant};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::routes::accounts::resolve_caller;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to purchase course access.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderRequest {
    /// `"7-days"` or `"permanent"`. Kept as a string so unsupported
    /// modes surface as a named validation error rather than a generic
    /// deserialization failure.
    pub access_mode: String,
}

/// A newly created trial grant.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrialResponse {
    #[schema(value_type = Object)]
    #[serde(flatten)]
    pub grant: TrialGrant,
}

/// A newly created enrollment grant.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    #[schema(value_type = Object)]
    #[serde(flatten)]
    pub grant: EnrollmentGrant,
    pub permanent: bool,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the enrollment router. All routes require authentication.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/courses/:id/trial", post(start_trial))
        .route("/v1/courses/:id/order", post(place_order))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/courses/:id/trial — Start a two-day trial.
#[utoipa::path(
    post,
    path = "/v1/courses/{id}/trial",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 201, description = "Trial started", body = TrialResponse),
        (status = 404, description = "Course not found", body = crate::error::ErrorBody),
        (status = 409, description = "Course already trialed", body = crate::error::ErrorBody),
    ),
    tag = "enrollment"
)]
pub async fn start_trial(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<TrialResponse>), AppError> {
    let caller_record = resolve_caller(&state, &caller)?;
    let course_id = CourseId(id);
    if !state.courses.contains(&id) {
        return Err(AppError::NotFound(format!("course {id} not found")));
    }

    let now = Timestamp::now();
    let grant = state
        .accounts
        .try_update(caller_record.id.as_uuid(), |a| {
            let grant = a.grants.begin_trial(course_id, now)?;
            a.updated_at = now;
            Ok::<_, campus_ledger::LedgerError>(grant)
        })
        .ok_or_else(|| AppError::Unauthorized("account for bearer token not found".into()))??;

    tracing::info!(account_id = %caller_record.id, course_id = %course_id, "trial started");
    Ok((StatusCode::CREATED, Json(TrialResponse { grant })))
}

/// POST /v1/courses/:id/order — Purchase timed or permanent access.
#[utoipa::path(
    post,
    path = "/v1/courses/{id}/order",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Access granted", body = OrderResponse),
        (status = 404, description = "Course not found", body = crate::error::ErrorBody),
        (status = 409, description = "Conflicting enrollment exists", body = crate::error::ErrorBody),
        (status = 422, description = "Unsupported access mode", body = crate::error::ErrorBody),
    ),
    tag = "enrollment"
)]
pub async fn place_order(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let req = extract_json(body)?;
    let mode = AccessMode::parse(&req.access_mode)?;

    let caller_record = resolve_caller(&state, &caller)?;
    let course_id = CourseId(id);
    if !state.courses.contains(&id) {
        return Err(AppError::NotFound(format!("course {id} not found")));
    }

    let now = Timestamp::now();
    let grant = state
        .accounts
        .try_update(caller_record.id.as_uuid(), |a| {
            let grant = a.grants.purchase(course_id, mode, now)?;
            a.updated_at = now;
            Ok::<_, campus_ledger::LedgerError>(grant)
        })
        .ok_or_else(|| AppError::Unauthorized("account for bearer token not found".into()))??;

    tracing::info!(account_id = %caller_record.id, course_id = %course_id, mode = %mode, "access purchased");
    let permanent = grant.is_permanent();
    Ok((
        StatusCode::CREATED,
        Json(OrderResponse { grant, permanent }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;
    use crate::routes::accounts::tests_support::profile;
    use crate::state::{AccountRecord, AppConfig, CourseRecord};
    use axum::body::Body;
    use axum::http::Request;
    use campus_accounts::AccountType;
    use campus_catalog::Course;
    use campus_core::AccountId;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::with_config(AppConfig::default())
    }

    fn seed_learner(state: &AppState, email: &str, phone: &str) -> AccountId {
        let record = AccountRecord::new(profile(email, phone, AccountType::Learner), "h".into());
        let id = record.id;
        state.accounts.insert(*record.id.as_uuid(), record);
        id
    }

    fn seed_course(state: &AppState) -> CourseId {
        let course = Course::new(
            "Course",
            4_900,
            "desc",
            vec![AccountId::new()],
            Vec::new(),
        )
        .unwrap();
        let record = CourseRecord::new(course);
        let id = record.course.id;
        state.courses.insert(*record.course.id.as_uuid(), record);
        id
    }

    fn trial_request(course: CourseId, caller: AccountId) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/v1/courses/{}/trial", course.as_uuid()))
            .header("Authorization", format!("Bearer {}", caller.as_uuid()))
            .body(Body::empty())
            .unwrap()
    }

    fn order_request(course: CourseId, caller: AccountId, mode: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/v1/courses/{}/order", course.as_uuid()))
            .header("Authorization", format!("Bearer {}", caller.as_uuid()))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"access_mode": mode}).to_string(),
            ))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn first_trial_returns_created_grant() {
        let state = test_state();
        let app = app(state.clone());
        let learner = seed_learner(&state, "t@example.com", "612340030");
        let course = seed_course(&state);

        let response = app.oneshot(trial_request(course, learner)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["course_id"], course.as_uuid().to_string());
        assert_eq!(body["active"], true);

        let stored = state.accounts.get(learner.as_uuid()).unwrap();
        assert!(stored.grants.has_trialed(course));
    }

    #[tokio::test]
    async fn second_trial_conflicts() {
        let state = test_state();
        let app = app(state.clone());
        let learner = seed_learner(&state, "t@example.com", "612340031");
        let course = seed_course(&state);

        assert_eq!(
            app.clone()
                .oneshot(trial_request(course, learner))
                .await
                .unwrap()
                .status(),
            StatusCode::CREATED
        );

        let response = app.oneshot(trial_request(course, learner)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("already been trialed"));
    }

    #[tokio::test]
    async fn trial_for_missing_course_is_404() {
        let state = test_state();
        let app = app(state.clone());
        let learner = seed_learner(&state, "t@example.com", "612340032");

        let response = app
            .oneshot(trial_request(CourseId::new(), learner))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn trial_requires_authentication() {
        let state = test_state();
        let app = app(state.clone());
        let course = seed_course(&state);

        let request = Request::builder()
            .method("POST")
            .uri(format!("/v1/courses/{}/trial", course.as_uuid()))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn timed_order_sets_end_date() {
        let state = test_state();
        let app = app(state.clone());
        let learner = seed_learner(&state, "o@example.com", "612340033");
        let course = seed_course(&state);

        let response = app
            .oneshot(order_request(course, learner, "7-days"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["permanent"], false);
        assert!(body["end_date"].is_string());
    }

    #[tokio::test]
    async fn permanent_order_has_no_end_date() {
        let state = test_state();
        let app = app(state.clone());
        let learner = seed_learner(&state, "o@example.com", "612340034");
        let course = seed_course(&state);

        let response = app
            .oneshot(order_request(course, learner, "permanent"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["permanent"], true);
        assert!(body.get("end_date").is_none());
    }

    #[tokio::test]
    async fn unsupported_mode_is_validation_error() {
        let state = test_state();
        let app = app(state.clone());
        let learner = seed_learner(&state, "o@example.com", "612340035");
        let course = seed_course(&state);

        let response = app
            .oneshot(order_request(course, learner, "lifetime"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("lifetime"));
    }

    #[tokio::test]
    async fn duplicate_timed_order_conflicts() {
        let state = test_state();
        let app = app(state.clone());
        let learner = seed_learner(&state, "o@example.com", "612340036");
        let course = seed_course(&state);

        assert_eq!(
            app.clone()
                .oneshot(order_request(course, learner, "7-days"))
                .await
                .unwrap()
                .status(),
            StatusCode::CREATED
        );
        let response = app
            .oneshot(order_request(course, learner, "7-days"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn permanent_blocks_all_further_orders() {
        let state = test_state();
        let app = app(state.clone());
        let learner = seed_learner(&state, "o@example.com", "612340037");
        let course = seed_course(&state);

        assert_eq!(
            app.clone()
                .oneshot(order_request(course, learner, "permanent"))
                .await
                .unwrap()
                .status(),
            StatusCode::CREATED
        );
        for mode in ["7-days", "permanent"] {
            let response = app
                .clone()
                .oneshot(order_request(course, learner, mode))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CONFLICT, "mode {mode}");
        }
    }

    #[tokio::test]
    async fn timed_then_permanent_upgrade_allowed() {
        let state = test_state();
        let app = app(state.clone());
        let learner = seed_learner(&state, "o@example.com", "612340038");
        let course = seed_course(&state);

        assert_eq!(
            app.clone()
                .oneshot(order_request(course, learner, "7-days"))
                .await
                .unwrap()
                .status(),
            StatusCode::CREATED
        );
        assert_eq!(
            app.oneshot(order_request(course, learner, "permanent"))
                .await
                .unwrap()
                .status(),
            StatusCode::CREATED
        );

        let stored = state.accounts.get(learner.as_uuid()).unwrap();
        assert_eq!(stored.grants.enrollments.len(), 2);
    }

    #[tokio::test]
    async fn trial_and_purchase_are_independent_tracks() {
        let state = test_state();
        let app = app(state.clone());
        let learner = seed_learner(&state, "o@example.com", "612340039");
        let course = seed_course(&state);

        assert_eq!(
            app.clone()
                .oneshot(trial_request(course, learner))
                .await
                .unwrap()
                .status(),
            StatusCode::CREATED
        );
        assert_eq!(
            app.oneshot(order_request(course, learner, "permanent"))
                .await
                .unwrap()
                .status(),
            StatusCode::CREATED
        );
    }
}
