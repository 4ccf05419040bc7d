//! Public statistics and leaderboard endpoints

use axum::{extract::State, Json};
use corefboard_common::db::{BestScore, LanguageLeaderboard, Statistics};

use crate::error::ApiError;
use crate::AppState;

/// GET /api/stats - homepage hero numbers
pub async fn get_statistics(State(state): State<AppState>) -> Result<Json<Statistics>, ApiError> {
    Ok(Json(state.store.statistics().await?))
}

/// GET /api/leaderboards
///
/// Per-language leaderboards, scores sorted by average F1 descending.
/// All rows are returned; the page decides how many to show.
pub async fn get_leaderboards(
    State(state): State<AppState>,
) -> Result<Json<Vec<LanguageLeaderboard>>, ApiError> {
    Ok(Json(state.store.leaderboards().await?))
}

/// GET /api/best-scores - each user's best submission per language
pub async fn get_best_scores(
    State(state): State<AppState>,
) -> Result<Json<Vec<BestScore>>, ApiError> {
    Ok(Json(state.store.best_scores_per_language().await?))
}
