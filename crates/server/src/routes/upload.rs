use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::require_active;
use crate::models::AuthUser;
use crate::AppState;

/// POST /upload-avatar
///
/// Spools the `avatar` field to a temp file, relays it to object storage and
/// returns the public URL. The temp file is removed on every path.
pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Value>> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    require_active(&caller)?;

    let mut field = loop {
        match multipart.next_field().await {
            Ok(Some(f)) if f.name() == Some("avatar") => break f,
            Ok(Some(_)) => continue,
            Ok(None) => return Err(ApiError::bad_request("No file")),
            Err(e) => return Err(multipart_error(e)),
        }
    };

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    if !content_type.starts_with("image/") {
        return Err(ApiError::bad_request("Only image uploads are allowed"));
    }

    let ext = file_extension(field.file_name().unwrap_or("avatar"));
    let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);

    let upload_dir = Path::new(&state.config.upload_dir);
    tokio::fs::create_dir_all(upload_dir).await.map_err(|e| {
        tracing::error!("Failed to create upload dir {:?}: {}", upload_dir, e);
        ApiError::Internal("Upload failed".into())
    })?;
    let temp_path = upload_dir.join(&stored_name);

    let result = match spool_field(&mut field, &temp_path, state.config.max_upload_bytes).await {
        Ok(()) => {
            let object = format!("avatars/{}-{}", caller.id, stored_name);
            state
                .storage
                .upload_file(&object, &temp_path, &content_type)
                .await
                .map_err(|e| {
                    tracing::error!("Avatar upload for user {} failed: {}", caller.id, e);
                    ApiError::Internal("Upload failed".into())
                })
        }
        Err(e) => Err(e),
    };

    remove_temp_file(&temp_path).await;

    let url = result?;
    tracing::info!("User {} uploaded avatar {}", caller.id, url);
    Ok(Json(json!({ "url": url })))
}

/// Stream a multipart field to disk, enforcing the size limit.
async fn spool_field(field: &mut Field<'_>, path: &Path, max_bytes: u64) -> Result<(), ApiError> {
    let mut file = tokio::fs::File::create(path).await.map_err(|e| {
        tracing::error!("Failed to create temp file {:?}: {}", path, e);
        ApiError::Internal("Upload failed".into())
    })?;

    let mut written: u64 = 0;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(e)),
        };

        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "File too large. Max size: {} MB",
                max_bytes / 1_048_576
            )));
        }

        file.write_all(&chunk).await.map_err(|e| {
            tracing::error!("Failed to write temp file {:?}: {}", path, e);
            ApiError::Internal("Upload failed".into())
        })?;
    }

    if written == 0 {
        return Err(ApiError::bad_request("Empty file"));
    }

    file.flush().await.map_err(|e| {
        tracing::error!("Failed to flush temp file {:?}: {}", path, e);
        ApiError::Internal("Upload failed".into())
    })?;
    Ok(())
}

/// The body limit surfaces mid-stream as a multipart error; keep it a 413.
fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::bad_request(err.body_text())
    }
}

async fn remove_temp_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove temp file {:?}: {}", path, e);
        }
    }
}

fn file_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin")
        .to_ascii_lowercase()
}
