//! corefboard-web library - coreference evaluation leaderboard service
//!
//! Users upload prediction files, an external Perl scorer compares them
//! against the stored gold standard for the chosen language, and the
//! parsed metrics feed per-language leaderboards.

use axum::Router;
use corefboard_common::config::DataDirs;

pub mod api;
pub mod error;
pub mod scorer;
pub mod session;
pub mod store;

use session::SessionStore;
use store::Store;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Data access with database-or-demo fallback
    pub store: Store,
    /// In-process session tokens
    pub sessions: SessionStore,
    /// Directory layout under the data root
    pub dirs: DataDirs,
}

impl AppState {
    /// Create new application state with an empty session store
    pub fn new(store: Store, dirs: DataDirs) -> Self {
        Self {
            store,
            sessions: SessionStore::new(),
            dirs,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::extract::DefaultBodyLimit;
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (valid session required)
    let protected = Router::new()
        .route("/client", get(api::client_dashboard))
        .route("/evaluate", post(api::evaluate))
        .route("/admin", get(api::admin_dashboard))
        .route("/admin/languages", post(api::add_language))
        .route("/admin/languages/:id", post(api::update_language))
        .route("/admin/languages/:id/delete", post(api::delete_language))
        .route("/admin/users", post(api::add_user))
        .route("/admin/gold-datasets", post(api::upload_gold_dataset))
        .route(
            "/admin/gold-datasets/:id/delete",
            post(api::delete_gold_dataset),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::session_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/home", get(api::home_redirect))
        .route("/login", get(api::serve_login).post(api::login))
        .route("/logout", get(api::logout))
        .route("/api/stats", get(api::get_statistics))
        .route("/api/leaderboards", get(api::get_leaderboards))
        .route("/api/best-scores", get(api::get_best_scores))
        .merge(api::health_routes());

    // Combine routers; uploads are capped at 10MB
    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
