//! Admin panel operations: language CRUD, account creation, gold datasets
//!
//! Every handler here requires the session user to be the admin account;
//! anyone else gets 403. Successful form posts redirect back to /admin.

use axum::{
    extract::{Multipart, Path, State},
    response::Redirect,
    Extension, Form,
};
use chrono::Local;
use serde::Deserialize;
use tracing::info;

use super::upload::read_upload;
use crate::error::ApiError;
use crate::session::SessionUser;
use crate::AppState;

/// Reject non-admin sessions
pub fn require_admin(user: &SessionUser) -> Result<(), ApiError> {
    if user.username == "admin" {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin access required".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct LanguageForm {
    pub language_code: String,
    pub language_name: String,
}

/// POST /admin/languages
pub async fn add_language(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<LanguageForm>,
) -> Result<Redirect, ApiError> {
    require_admin(&user)?;

    let language = state
        .store
        .add_language(&form.language_code, &form.language_name)
        .await?;
    info!(
        "Language '{}' ({}) added",
        language.language_name, language.language_code
    );
    Ok(Redirect::to("/admin"))
}

/// POST /admin/languages/:id
pub async fn update_language(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
    Form(form): Form<LanguageForm>,
) -> Result<Redirect, ApiError> {
    require_admin(&user)?;

    state
        .store
        .update_language(id, &form.language_code, &form.language_name)
        .await?;
    info!("Language {} updated", id);
    Ok(Redirect::to("/admin"))
}

/// POST /admin/languages/:id/delete
///
/// The language's gold datasets go with it.
pub async fn delete_language(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    require_admin(&user)?;

    state.store.delete_language(id).await?;
    info!("Language {} deleted", id);
    Ok(Redirect::to("/admin"))
}

#[derive(Debug, Deserialize)]
pub struct NewUserForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// POST /admin/users
pub async fn add_user(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<NewUserForm>,
) -> Result<Redirect, ApiError> {
    require_admin(&user)?;

    let created = state
        .store
        .add_user(&form.username, &form.email, &form.password)
        .await?;
    info!("User '{}' created", created.username);
    Ok(Redirect::to("/admin"))
}

/// POST /admin/gold-datasets - multipart upload of a reference file.
///
/// Stored under `gold_datasets/lang_<language_id>/<timestamp>_<name>`.
pub async fn upload_gold_dataset(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    mut multipart: Multipart,
) -> Result<Redirect, ApiError> {
    require_admin(&user)?;

    let upload = read_upload(&mut multipart).await?;

    let languages = state.store.list_languages().await?;
    if !languages.iter().any(|l| l.id == upload.language_id) {
        return Err(ApiError::BadRequest(format!(
            "Language {} not found",
            upload.language_id
        )));
    }

    let dir = state.dirs.gold_dataset_dir(upload.language_id);
    tokio::fs::create_dir_all(&dir).await?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let stored = dir.join(format!("{}_{}", stamp, upload.filename));
    tokio::fs::write(&stored, &upload.data).await?;

    state
        .store
        .add_gold_dataset(
            upload.language_id,
            &upload.filename,
            &stored.to_string_lossy(),
            &user.username,
        )
        .await?;
    info!(
        "Gold dataset '{}' uploaded for language {}",
        upload.filename, upload.language_id
    );
    Ok(Redirect::to("/admin"))
}

/// POST /admin/gold-datasets/:id/delete
///
/// Removes the database row and the file on disk.
pub async fn delete_gold_dataset(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    require_admin(&user)?;

    state.store.delete_gold_dataset(id).await?;
    info!("Gold dataset {} deleted", id);
    Ok(Redirect::to("/admin"))
}
