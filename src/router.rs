//! Router assembly and shared application state.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

use crate::auth::JwtManager;
use crate::db::Db;
use crate::handlers::{admin, public};

/// Public inquiry submissions allowed per minute.
const INQUIRY_QUOTA_PER_MINUTE: NonZeroU32 = NonZeroU32::new(10).unwrap();

/// Shared state injected into every handler. Constructed once by the
/// process entry point (or a test) and cloned per request by axum.
#[derive(Clone)]
pub struct AtelierState {
    pub db: Arc<Db>,
    pub jwt: Arc<JwtManager>,
    pub inquiry_limiter: Arc<DefaultDirectRateLimiter>,
}

impl AtelierState {
    pub fn new(db: Arc<Db>, jwt: Arc<JwtManager>) -> Self {
        Self {
            db,
            jwt,
            inquiry_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(
                INQUIRY_QUOTA_PER_MINUTE,
            ))),
        }
    }
}

pub fn atelier_router(state: AtelierState) -> Router {
    Router::new()
        .route("/api/projects", get(public::list_projects))
        .route("/api/site-status", get(public::site_status))
        .route("/api/project-request", post(public::create_project_request))
        .route("/api/health", get(public::health))
        .route("/api/admin/login", post(admin::login))
        .route(
            "/api/admin/projects",
            get(admin::list_projects).post(admin::create_project),
        )
        .route(
            "/api/admin/projects/{id}",
            put(admin::update_project).delete(admin::delete_project),
        )
        .route("/api/admin/project-requests", get(admin::list_requests))
        .route(
            "/api/admin/project-requests/{id}",
            get(admin::get_request)
                .put(admin::update_request_status)
                .delete(admin::delete_request),
        )
        .route("/api/admin/stats", get(admin::stats))
        .route(
            "/api/admin/settings",
            get(admin::get_settings).post(admin::update_settings),
        )
        .route("/api/admin/repair-database", post(admin::repair_database))
        .with_state(state)
}
