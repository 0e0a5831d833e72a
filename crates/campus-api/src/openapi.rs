//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus API",
        version = "0.1.0",
        description = "Course marketplace API: accounts, catalog, and the trial/enrollment grant ledger.",
        license(name = "MIT")
    ),
    paths(
        // Accounts
        crate::routes::accounts::register_account,
        crate::routes::accounts::get_account,
        crate::routes::accounts::get_grants,
        crate::routes::accounts::request_password_reset,
        crate::routes::accounts::complete_password_reset,
        // Catalog
        crate::routes::catalog::create_course,
        crate::routes::catalog::list_courses,
        crate::routes::catalog::get_course,
        crate::routes::catalog::update_course,
        crate::routes::catalog::set_course_categories,
        crate::routes::catalog::list_categories,
        crate::routes::catalog::create_category,
        // Enrollment
        crate::routes::enrollment::start_trial,
        crate::routes::enrollment::place_order,
    ),
    components(schemas(
        // State record types
        crate::state::AccountRecord,
        crate::state::CourseRecord,
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Account DTOs
        crate::routes::accounts::RegisterAccountRequest,
        crate::routes::accounts::GrantsResponse,
        crate::routes::accounts::TrialStatus,
        crate::routes::accounts::EnrollmentStatus,
        crate::routes::accounts::ResetRequestBody,
        crate::routes::accounts::ResetTokenResponse,
        crate::routes::accounts::ResetCompleteBody,
        // Catalog DTOs
        crate::routes::catalog::CreateCourseRequest,
        crate::routes::catalog::UpdateCourseRequest,
        crate::routes::catalog::SetCategoriesRequest,
        crate::routes::catalog::CreateCategoryRequest,
        // Enrollment DTOs
        crate::routes::enrollment::OrderRequest,
        crate::routes::enrollment::TrialResponse,
        crate::routes::enrollment::OrderResponse,
    )),
    tags(
        (name = "accounts", description = "Registration, account lookup, and password reset"),
        (name = "catalog", description = "Courses and categories"),
        (name = "enrollment", description = "Trials and purchases against the grant ledger"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
