//! Multipart form reading shared by the evaluation and gold-dataset
//! upload endpoints

use axum::extract::Multipart;
use std::path::Path;

use crate::error::ApiError;

/// A file upload plus its language selection
pub struct FileUpload {
    pub language_id: i64,
    pub filename: String,
    pub data: Vec<u8>,
}

/// Read a `language_id` + `file` multipart form.
///
/// Only `.txt` files are accepted; the filename is stripped to its
/// final component so a crafted name cannot escape the target directory.
pub async fn read_upload(multipart: &mut Multipart) -> Result<FileUpload, ApiError> {
    let mut language_id = None;
    let mut filename = None;
    let mut data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("language_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable field: {}", e)))?;
                let parsed = text.trim().parse::<i64>().map_err(|_| {
                    ApiError::BadRequest("language_id must be an integer".to_string())
                })?;
                language_id = Some(parsed);
            }
            Some("file") => {
                filename = field.file_name().map(sanitize_filename);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable file field: {}", e)))?;
                data = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let language_id = language_id
        .ok_or_else(|| ApiError::BadRequest("language_id field is required".to_string()))?;
    let filename = filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::BadRequest("file field with a filename is required".to_string()))?;
    let data =
        data.ok_or_else(|| ApiError::BadRequest("file field is required".to_string()))?;

    if !filename.to_lowercase().ends_with(".txt") {
        return Err(ApiError::BadRequest(
            "Only .txt files are supported".to_string(),
        ));
    }

    Ok(FileUpload {
        language_id,
        filename,
        data,
    })
}

/// Keep only the final path component of a client-supplied filename
fn sanitize_filename(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
