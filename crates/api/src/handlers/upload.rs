//! Image upload handler and the shared storage helpers.

use std::path::{Path, PathBuf};

use atelier_core::upload::validate_image_upload;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for a stored upload.
#[derive(Debug, Serialize)]
pub struct UploadedImage {
    pub url: String,
}

/// An image written to the upload directory.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Public URL the file is served from.
    pub url: String,
    /// Location on disk.
    pub path: PathBuf,
}

/// Validate and write an image under the upload directory.
pub async fn store_image(
    config: &ServerConfig,
    filename: &str,
    data: &[u8],
) -> AppResult<StoredImage> {
    let ext = validate_image_upload(filename, data.len())?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let stored_name = format!("{}.{ext}", Uuid::new_v4());
    let path = config.upload_dir.join(&stored_name);
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(StoredImage {
        url: format!(
            "{}/{stored_name}",
            config.public_upload_base.trim_end_matches('/')
        ),
        path,
    })
}

/// Remove a stored image that nothing ended up referencing.
pub async fn discard_image(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove orphaned upload");
    }
}

/// POST /api/v1/upload
///
/// Accepts a multipart form with a single `file` image field and returns the
/// public URL of the stored file.
pub async fn upload_image(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut file_data: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            file_data = Some((filename, data.to_vec()));
        }
    }

    let (filename, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let url = store_image(&state.config, &filename, &data).await?.url;

    tracing::info!(user_id = auth.user_id, url = %url, size = data.len(), "Image uploaded");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadedImage { url },
        }),
    ))
}
