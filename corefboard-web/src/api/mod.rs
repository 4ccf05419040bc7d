//! HTTP API handlers

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod evaluate;
pub mod health;
pub mod leaderboard;
pub mod ui;
pub mod upload;

pub use admin::{
    add_language, add_user, delete_gold_dataset, delete_language, update_language,
    upload_gold_dataset,
};
pub use auth::{login, logout, session_middleware, SESSION_COOKIE};
pub use dashboard::{admin_dashboard, client_dashboard};
pub use evaluate::evaluate;
pub use health::{health_check, health_routes};
pub use leaderboard::{get_best_scores, get_leaderboards, get_statistics};
pub use ui::{home_redirect, serve_index, serve_login};
