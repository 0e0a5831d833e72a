//! # Catalog API
//!
//! Course and category management. Edit authority is re-resolved from
//! the persisted account and course records on every request; nothing
//! authorization-relevant is trusted from the token.
//!
//! ## Endpoints
//!
//! - `GET /v1/courses` — list courses, sorted by name (public)
//! - `GET /v1/courses/:id` — get course (public)
//! - `POST /v1/courses` — publish a course (instructor)
//! - `PUT /v1/courses/:id` — edit a course (lead instructor or admin)
//! - `PUT /v1/courses/:id/categories` — replace categories (lead or admin)
//! - `GET /v1/categories` — list categories (public)
//! - `POST /v1/categories` — create a category (admin)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use campus_catalog::{can_edit, slugify, Category, Course};
use campus_core::{CategoryId, Timestamp};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::accounts::resolve_caller;
use crate::state::{AppState, CourseRecord};

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to publish a new course. The caller becomes the lead
/// instructor.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    pub name: String,
    /// Price in minor currency units.
    pub price_cents: u64,
    pub description: String,
    /// Additional instructors without edit authority.
    #[serde(default)]
    pub co_instructors: Vec<Uuid>,
    /// Existing category ids.
    #[serde(default)]
    pub categories: Vec<Uuid>,
}

impl Validate for CreateCourseRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description must not be empty".to_string());
        }
        Ok(())
    }
}

/// Request to edit an existing course. Absent fields are left alone.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub price_cents: Option<u64>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub featured: Option<bool>,
}

impl Validate for UpdateCourseRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref name) = self.name {
            if name.trim().is_empty() {
                return Err("name must not be empty if provided".to_string());
            }
        }
        if let Some(ref description) = self.description {
            if description.trim().is_empty() {
                return Err("description must not be empty if provided".to_string());
            }
        }
        Ok(())
    }
}

/// Request to replace a course's categories by name. Names matching an
/// existing slug reuse that category; the rest are created.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetCategoriesRequest {
    pub categories: Vec<String>,
}

impl Validate for SetCategoriesRequest {
    fn validate(&self) -> Result<(), String> {
        if self.categories.iter().any(|c| slugify(c).is_empty()) {
            return Err("category names must contain letters or digits".to_string());
        }
        Ok(())
    }
}

/// Request to create a category.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
}

impl Validate for CreateCategoryRequest {
    fn validate(&self) -> Result<(), String> {
        if slugify(&self.name).is_empty() {
            return Err("name must contain letters or digits".to_string());
        }
        Ok(())
    }
}

// ── Routers ─────────────────────────────────────────────────────────

/// Routes reachable without authentication.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/v1/courses", get(list_courses))
        .route("/v1/courses/:id", get(get_course))
        .route("/v1/categories", get(list_categories))
}

/// Routes behind the auth middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/courses", post(create_course))
        .route("/v1/courses/:id", put(update_course))
        .route("/v1/courses/:id/categories", put(set_course_categories))
        .route("/v1/categories", post(create_category))
}

// ── Helpers ─────────────────────────────────────────────────────────

fn load_course(state: &AppState, id: Uuid) -> Result<CourseRecord, AppError> {
    state
        .courses
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("course {id} not found")))
}

/// Check edit authority against persisted records only.
fn require_edit_authority(
    state: &AppState,
    caller: &CallerIdentity,
    course: &Course,
) -> Result<(), AppError> {
    let caller_record = resolve_caller(state, caller)?;
    if can_edit(course, caller_record.id, caller_record.profile.account_type) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "only the lead instructor or an admin may edit this course".into(),
        ))
    }
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/courses — Publish a new course.
#[utoipa::path(
    post,
    path = "/v1/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseRecord),
        (status = 403, description = "Caller is not an instructor", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "catalog"
)]
pub async fn create_course(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateCourseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CourseRecord>), AppError> {
    let req = extract_validated_json(body)?;

    let caller_record = resolve_caller(&state, &caller)?;
    if !caller_record.profile.is_instructor() {
        return Err(AppError::Forbidden(
            "only instructors may publish courses".into(),
        ));
    }

    // Co-instructors must be existing instructor accounts.
    let mut instructors = vec![caller_record.id];
    for co in &req.co_instructors {
        let record = state.accounts.get(co).ok_or_else(|| {
            AppError::Validation(format!("co-instructor {co} does not exist"))
        })?;
        if !record.profile.is_instructor() {
            return Err(AppError::Validation(format!(
                "account {co} is not an instructor"
            )));
        }
        instructors.push(record.id);
    }

    let mut categories = Vec::with_capacity(req.categories.len());
    for cat in &req.categories {
        if !state.category_exists(CategoryId(*cat)) {
            return Err(AppError::Validation(format!(
                "category {cat} does not exist"
            )));
        }
        categories.push(CategoryId(*cat));
    }

    let course = Course::new(
        req.name,
        req.price_cents,
        req.description,
        instructors,
        categories,
    )?;
    let record = CourseRecord::new(course);
    state
        .courses
        .insert(*record.course.id.as_uuid(), record.clone());
    tracing::info!(course_id = %record.course.id, lead = %caller_record.id, "course published");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/courses — List all courses, sorted by name.
#[utoipa::path(
    get,
    path = "/v1/courses",
    responses(
        (status = 200, description = "Courses sorted by name", body = Vec<CourseRecord>),
    ),
    tag = "catalog"
)]
pub async fn list_courses(State(state): State<AppState>) -> Json<Vec<CourseRecord>> {
    let mut courses = state.courses.list();
    courses.sort_by(|a, b| a.course.name.cmp(&b.course.name));
    Json(courses)
}

/// GET /v1/courses/:id — Get a single course.
#[utoipa::path(
    get,
    path = "/v1/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found", body = CourseRecord),
        (status = 404, description = "Course not found", body = crate::error::ErrorBody),
    ),
    tag = "catalog"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseRecord>, AppError> {
    load_course(&state, id).map(Json)
}

/// PUT /v1/courses/:id — Edit a course.
#[utoipa::path(
    put,
    path = "/v1/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseRecord),
        (status = 403, description = "Not the lead instructor or an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Course not found", body = crate::error::ErrorBody),
    ),
    tag = "catalog"
)]
pub async fn update_course(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateCourseRequest>, JsonRejection>,
) -> Result<Json<CourseRecord>, AppError> {
    let req = extract_validated_json(body)?;

    let record = load_course(&state, id)?;
    require_edit_authority(&state, &caller, &record.course)?;

    state
        .courses
        .update(&id, |r| {
            if let Some(name) = req.name {
                r.course.name = name;
            }
            if let Some(price) = req.price_cents {
                r.course.price_cents = price;
            }
            if let Some(description) = req.description {
                r.course.description = description;
            }
            if let Some(image) = req.image {
                r.course.image = Some(image);
            }
            if let Some(featured) = req.featured {
                r.course.featured = featured;
            }
            r.updated_at = Timestamp::now();
        })
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("course {id} not found")))
}

/// PUT /v1/courses/:id/categories — Replace a course's categories.
///
/// Category names are matched by slug; unmatched names create new
/// categories so instructors never race admins on taxonomy setup.
#[utoipa::path(
    put,
    path = "/v1/courses/{id}/categories",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = SetCategoriesRequest,
    responses(
        (status = 200, description = "Categories replaced", body = CourseRecord),
        (status = 403, description = "Not the lead instructor or an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Course not found", body = crate::error::ErrorBody),
    ),
    tag = "catalog"
)]
pub async fn set_course_categories(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<SetCategoriesRequest>, JsonRejection>,
) -> Result<Json<CourseRecord>, AppError> {
    let req = extract_validated_json(body)?;

    let record = load_course(&state, id)?;
    require_edit_authority(&state, &caller, &record.course)?;

    let mut category_ids = Vec::with_capacity(req.categories.len());
    for name in &req.categories {
        let slug = slugify(name);
        let category = match state.category_by_slug(&slug) {
            Some(existing) => existing,
            None => {
                let created = Category::new(name.clone());
                state
                    .categories
                    .insert(*created.id.as_uuid(), created.clone());
                created
            }
        };
        if !category_ids.contains(&category.id) {
            category_ids.push(category.id);
        }
    }

    state
        .courses
        .update(&id, |r| {
            r.course.categories = category_ids;
            r.updated_at = Timestamp::now();
        })
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("course {id} not found")))
}

/// GET /v1/categories — List all categories, sorted by name.
#[utoipa::path(
    get,
    path = "/v1/categories",
    responses(
        (status = 200, description = "Categories sorted by name", body = Vec<Object>),
    ),
    tag = "catalog"
)]
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    let mut categories = state.categories.list();
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Json(categories)
}

/// POST /v1/categories — Create a category.
#[utoipa::path(
    post,
    path = "/v1/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Object),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
        (status = 409, description = "Slug already taken", body = crate::error::ErrorBody),
    ),
    tag = "catalog"
)]
pub async fn create_category(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let req = extract_validated_json(body)?;

    let caller_record = resolve_caller(&state, &caller)?;
    if !caller_record.profile.is_admin() {
        return Err(AppError::Forbidden(
            "only admins may create categories directly".into(),
        ));
    }

    let slug = slugify(&req.name);
    if state.category_by_slug(&slug).is_some() {
        return Err(AppError::Conflict(format!(
            "a category with slug {slug:?} already exists"
        )));
    }

    let category = Category::new(req.name);
    state
        .categories
        .insert(*category.id.as_uuid(), category.clone());
    Ok((StatusCode::CREATED, Json(category)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;
    use crate::routes::accounts::tests_support::profile;
    use crate::state::{AccountRecord, AppConfig};
    use axum::body::Body;
    use axum::http::Request;
    use campus_accounts::AccountType;
    use campus_core::{AccountId, CourseId};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::with_config(AppConfig::default())
    }

    fn seed_account(state: &AppState, email: &str, phone: &str, kind: AccountType) -> AccountId {
        let record = AccountRecord::new(profile(email, phone, kind), "h".into());
        let id = record.id;
        state.accounts.insert(*record.id.as_uuid(), record);
        id
    }

    fn seed_course(state: &AppState, name: &str, lead: AccountId) -> CourseId {
        let course = Course::new(name, 4_900, "desc", vec![lead], Vec::new()).unwrap();
        let record = CourseRecord::new(course);
        let id = record.course.id;
        state.courses.insert(*record.course.id.as_uuid(), record);
        id
    }

    fn authed_json(
        method: &str,
        uri: &str,
        caller: AccountId,
        body: &serde_json::Value,
    ) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", caller.as_uuid()))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn instructor_creates_course_as_lead() {
        let state = test_state();
        let app = app(state.clone());
        let lead = seed_account(&state, "i@example.com", "612340010", AccountType::Instructor);

        let response = app
            .oneshot(authed_json(
                "POST",
                "/v1/courses",
                lead,
                &serde_json::json!({
                    "name": "Intro to Rust",
                    "price_cents": 4900,
                    "description": "Ownership, borrowing, lifetimes.",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["course"]["name"], "Intro to Rust");
        assert_eq!(
            body["course"]["instructors"][0],
            lead.as_uuid().to_string()
        );
    }

    #[tokio::test]
    async fn learner_cannot_create_course() {
        let state = test_state();
        let app = app(state.clone());
        let learner = seed_account(&state, "l@example.com", "612340011", AccountType::Learner);

        let response = app
            .oneshot(authed_json(
                "POST",
                "/v1/courses",
                learner,
                &serde_json::json!({
                    "name": "Nope",
                    "price_cents": 100,
                    "description": "d",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_co_instructor_rejected() {
        let state = test_state();
        let app = app(state.clone());
        let lead = seed_account(&state, "i@example.com", "612340012", AccountType::Instructor);

        let response = app
            .oneshot(authed_json(
                "POST",
                "/v1/courses",
                lead,
                &serde_json::json!({
                    "name": "Course",
                    "price_cents": 100,
                    "description": "d",
                    "co_instructors": [Uuid::new_v4()],
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn course_list_is_sorted_and_public() {
        let state = test_state();
        let app = app(state.clone());
        let lead = seed_account(&state, "i@example.com", "612340013", AccountType::Instructor);
        seed_course(&state, "Zig Basics", lead);
        seed_course(&state, "Algorithms", lead);

        let request = Request::builder()
            .uri("/v1/courses")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body[0]["course"]["name"], "Algorithms");
        assert_eq!(body[1]["course"]["name"], "Zig Basics");
    }

    #[tokio::test]
    async fn co_instructor_cannot_edit_course() {
        let state = test_state();
        let app = app(state.clone());
        let lead = seed_account(&state, "lead@example.com", "612340014", AccountType::Instructor);
        let co = seed_account(&state, "co@example.com", "612340015", AccountType::Instructor);
        let course = seed_course(&state, "Course", lead);
        state.courses.update(course.as_uuid(), |r| {
            r.course.instructors.push(co);
        });

        let response = app
            .oneshot(authed_json(
                "PUT",
                &format!("/v1/courses/{}", course.as_uuid()),
                co,
                &serde_json::json!({"name": "Hijacked"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_can_edit_any_course() {
        let state = test_state();
        let app = app(state.clone());
        let lead = seed_account(&state, "lead@example.com", "612340016", AccountType::Instructor);
        let admin = seed_account(&state, "admin@example.com", "612340017", AccountType::Admin);
        let course = seed_course(&state, "Course", lead);

        let response = app
            .oneshot(authed_json(
                "PUT",
                &format!("/v1/courses/{}", course.as_uuid()),
                admin,
                &serde_json::json!({"featured": true, "price_cents": 9900}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["course"]["featured"], true);
        assert_eq!(body["course"]["price_cents"], 9900);
    }

    #[tokio::test]
    async fn demoted_instructor_loses_edit_authority() {
        // Authority comes from the persisted record, not the token.
        let state = test_state();
        let app = app(state.clone());
        let lead = seed_account(&state, "lead@example.com", "612340018", AccountType::Instructor);
        let course = seed_course(&state, "Course", lead);

        // Replace the lead so the original account is no longer first.
        let new_lead = seed_account(&state, "new@example.com", "612340019", AccountType::Instructor);
        state.courses.update(course.as_uuid(), |r| {
            r.course.instructors = vec![new_lead, lead];
        });

        let response = app
            .oneshot(authed_json(
                "PUT",
                &format!("/v1/courses/{}", course.as_uuid()),
                lead,
                &serde_json::json!({"name": "Still mine?"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn set_categories_reuses_existing_slugs() {
        let state = test_state();
        let app = app(state.clone());
        let lead = seed_account(&state, "lead@example.com", "612340020", AccountType::Instructor);
        let course = seed_course(&state, "Course", lead);

        let existing = Category::new("Data Science");
        let existing_id = existing.id;
        state.categories.insert(*existing.id.as_uuid(), existing);

        let response = app
            .oneshot(authed_json(
                "PUT",
                &format!("/v1/courses/{}/categories", course.as_uuid()),
                lead,
                &serde_json::json!({"categories": ["data science", "Watercolor"]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let ids = body["course"]["categories"].as_array().unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], existing_id.as_uuid().to_string());
        // The unmatched name was created with a fresh slug.
        assert!(state.category_by_slug("watercolor").is_some());
        assert_eq!(state.categories.len(), 2);
    }

    #[tokio::test]
    async fn only_admin_creates_categories() {
        let state = test_state();
        let app = app(state.clone());
        let admin = seed_account(&state, "admin@example.com", "612340021", AccountType::Admin);
        let instructor =
            seed_account(&state, "i@example.com", "612340022", AccountType::Instructor);

        let response = app
            .clone()
            .oneshot(authed_json(
                "POST",
                "/v1/categories",
                instructor,
                &serde_json::json!({"name": "Photography"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(authed_json(
                "POST",
                "/v1/categories",
                admin,
                &serde_json::json!({"name": "Photography"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // Duplicate slug conflicts.
        let response = app
            .oneshot(authed_json(
                "POST",
                "/v1/categories",
                admin,
                &serde_json::json!({"name": "PHOTOGRAPHY"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn get_missing_course_is_404() {
        let app = app(test_state());
        let request = Request::builder()
            .uri(format!("/v1/courses/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
