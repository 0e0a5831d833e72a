//! # campus-api — Axum API Service for Campus
//!
//! HTTP surface over the Campus domain crates: account registration and
//! password reset (campus-accounts), the course catalog (campus-catalog),
//! and the trial/enrollment grant ledger (campus-ledger).
//!
//! ## API Surface
//!
//! | Prefix                       | Module                  | Auth        |
//! |------------------------------|-------------------------|-------------|
//! | `POST /v1/accounts`          | [`routes::accounts`]    | public      |
//! | `/v1/password-reset/*`       | [`routes::accounts`]    | public      |
//! | `GET /v1/courses*`           | [`routes::catalog`]     | public      |
//! | `GET /v1/categories`         | [`routes::catalog`]     | public      |
//! | `/v1/accounts/:id*`          | [`routes::accounts`]    | bearer      |
//! | write `/v1/courses*`         | [`routes::catalog`]     | bearer      |
//! | `/v1/courses/:id/trial`      | [`routes::enrollment`]  | bearer      |
//! | `/v1/courses/:id/order`      | [`routes::enrollment`]  | bearer      |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Auto-generated OpenAPI spec via utoipa derive macros at `/openapi.json`.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes, registration, password reset, catalog reads, and the
/// OpenAPI spec are mounted outside the auth middleware so they remain
/// accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::accounts::router())
        .merge(routes::catalog::router())
        .merge(routes::enrollment::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(axum::Extension(auth_config));

    // Unauthenticated routes.
    let public = Router::new()
        .merge(routes::accounts::public_router())
        .merge(routes::catalog::public_router())
        .merge(openapi::router());

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new()
        .merge(public)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(health)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
