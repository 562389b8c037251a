//! checkscam-web library - community scam-reporting web service
//!
//! Exposes the router and application state for integration testing.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod pagination;
pub mod services;

use services::{PhoneCheckService, ScamOracle};

/// Maximum multipart body size for report submissions (10 MB)
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Multi-provider phone risk aggregation
    pub phone_check: Arc<PhoneCheckService>,
    /// Generative-text oracle (search escalation + feed import)
    pub oracle: Arc<ScamOracle>,
    /// Directory served under /media
    pub media_root: PathBuf,
    /// Upload target for evidence images (inside media_root)
    pub images_dir: PathBuf,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        phone_check: PhoneCheckService,
        oracle: ScamOracle,
        media_root: PathBuf,
    ) -> Self {
        let images_dir = media_root.join("scam_images");
        Self {
            db,
            phone_check: Arc::new(phone_check),
            oracle: Arc::new(oracle),
            media_root,
            images_dir,
        }
    }
}

/// Build application router
///
/// Three tiers: public routes, session-protected report submission, and
/// moderator-only curation endpoints.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Moderator routes (session + moderator flag). Deletion is a POST
    // action, mirroring the original moderation form.
    let moderator = Router::new()
        .route("/api/posts/:guid/approve", post(api::approve_post))
        .route("/api/posts/:guid/delete", post(api::delete_post))
        .route("/api/moderation/pending", get(api::list_pending))
        .route("/api/feed/fetch", post(api::fetch_feed))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_moderator,
        ));

    // Authenticated routes (any logged-in user)
    let authenticated = Router::new()
        .route("/api/report", post(api::submit_report))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_session,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/search", get(api::search))
        .route("/api/posts", get(api::list_posts).post(api::create_post))
        .route("/api/posts/:guid", get(api::get_post))
        .route("/api/auth/register", post(api::register))
        .route("/api/auth/login", post(api::login))
        .route("/api/auth/logout", post(api::logout))
        .merge(api::health_routes());

    // Combine routers; uploaded images are served straight off disk.
    Router::new()
        .merge(moderator)
        .merge(authenticated)
        .merge(public)
        .nest_service("/media", ServeDir::new(&state.media_root))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
