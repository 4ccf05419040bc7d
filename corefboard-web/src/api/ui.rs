//! UI serving routes
//!
//! Serves the static HTML pages; leaderboard and statistics data load
//! client-side from the /api/* endpoints.

use axum::response::{Html, Redirect};

const INDEX_HTML: &str = include_str!("../ui/index.html");
const LOGIN_HTML: &str = include_str!("../ui/login.html");

/// GET /
///
/// Serves the public homepage
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /login
///
/// Serves the login form page
pub async fn serve_login() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// GET /home
///
/// Legacy alias for the homepage
pub async fn home_redirect() -> Redirect {
    Redirect::to("/")
}
