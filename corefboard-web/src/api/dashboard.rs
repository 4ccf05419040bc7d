//! Client and admin dashboard data endpoints

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde_json::json;

use crate::error::ApiError;
use crate::session::SessionUser;
use crate::AppState;

/// GET /client - the signed-in user's workspace.
///
/// Admin accounts are sent to the admin panel instead.
pub async fn client_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> Result<Response, ApiError> {
    if user.username == "admin" {
        return Ok(Redirect::to("/admin").into_response());
    }

    let languages = state.store.list_languages().await?;
    let evaluations = state.store.user_history(user.id).await?;

    Ok(Json(json!({
        "user": user,
        "languages": languages,
        "evaluations": evaluations,
    }))
    .into_response())
}

/// GET /admin - languages and gold datasets overview
pub async fn admin_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> Result<Response, ApiError> {
    super::admin::require_admin(&user)?;

    let languages = state.store.list_languages().await?;
    let gold_datasets = state.store.list_gold_datasets().await?;

    Ok(Json(json!({
        "user": user,
        "languages": languages,
        "gold_datasets": gold_datasets,
    }))
    .into_response())
}
