//! Prediction upload and scoring endpoint

use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use chrono::Local;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{error, info};

use super::upload::read_upload;
use crate::error::ApiError;
use crate::scorer::Scorer;
use crate::session::SessionUser;
use crate::AppState;

/// POST /evaluate - multipart `language_id` + `file`.
///
/// The gold dataset must exist before the upload is persisted or
/// scored; the scorer run and the saved scores follow only from there.
pub async fn evaluate(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let upload = read_upload(&mut multipart).await?;

    let gold = state
        .store
        .find_gold_dataset(upload.language_id)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest(
                "No gold dataset available for this language. Contact the administrator."
                    .to_string(),
            )
        })?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let stored = state
        .dirs
        .uploads
        .join(format!("{}_{}_{}", user.id, stamp, upload.filename));
    tokio::fs::write(&stored, &upload.data).await?;
    info!(
        "User '{}' uploaded '{}' for language {}",
        user.username, upload.filename, upload.language_id
    );

    let scorer = Scorer::new(state.dirs.scorer.clone());
    let scores = match scorer.score(Path::new(&gold.file_path), &stored).await {
        Ok(scores) => scores,
        Err(e) => {
            error!("Scoring failed for '{}': {}", upload.filename, e);
            return Err(e.into());
        }
    };

    state
        .store
        .save_evaluation(
            user.id,
            upload.language_id,
            &upload.filename,
            &stored.to_string_lossy(),
            &scores,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "scores": scores,
        "message": "Evaluation completed successfully",
    })))
}
