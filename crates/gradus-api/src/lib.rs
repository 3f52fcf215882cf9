mod error;
mod identity;
mod limit;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use identity::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER, Identity};
pub use limit::{RateLimit, TokenBucketLimiter};
pub use state::AppState;

use axum::Router;
use axum::middleware;
use axum::routing::{get, patch, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/users", post(routes::users::create))
        .route("/api/theses", get(routes::theses::roster))
        .route("/api/theses/assign", post(routes::theses::assign))
        .route("/api/theses/mine", get(routes::theses::mine))
        .route("/api/theses/{id}", get(routes::theses::detail))
        .route(
            "/api/theses/{id}/percentage",
            patch(routes::theses::override_percentage),
        )
        .route("/api/theses/{id}/activity", get(routes::theses::activity))
        .route(
            "/api/theses/{id}/activity/report",
            get(routes::theses::activity_report),
        )
        .route("/api/chapters", post(routes::chapters::create))
        .route(
            "/api/chapters/{id}",
            patch(routes::chapters::edit).delete(routes::chapters::remove),
        )
        .route(
            "/api/chapters/{id}/percentage",
            patch(routes::chapters::percentage),
        )
        .route("/api/chapters/{id}/approve", patch(routes::chapters::approve))
        .route("/api/comments", post(routes::comments::create))
        .route("/api/milestones", post(routes::milestones::create))
        .route(
            "/api/milestones/{id}",
            patch(routes::milestones::edit).delete(routes::milestones::remove),
        )
        .route(
            "/api/milestones/{id}/complete",
            patch(routes::milestones::complete),
        )
        .route("/api/ranking", get(routes::ranking::ranking))
        .route("/api/files", post(routes::files::upload))
        .layer(middleware::from_fn_with_state(state.clone(), limit::enforce))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
