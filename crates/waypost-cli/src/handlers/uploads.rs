//! Staging and promotion of uploads
//!
//! Files land in the `tmp` bucket first and are moved into a permanent
//! bucket only once the caller's transaction has gone through.

use crate::error::ErrorCode;
use crate::state::PROMOTION_BUCKETS;
use crate::{ApiError, AppState};
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use waypost_store::{sanitize, CleanupError, StoredObject, UploadBatch, BUCKET_IMAGES, BUCKET_TMP};

/// Response listing staged objects
#[derive(Debug, Serialize, Deserialize)]
pub struct StagedUploads {
    pub files: Vec<StoredObject>,
}

/// Body of POST /uploads/promote
#[derive(Debug, Serialize, Deserialize)]
pub struct PromoteRequest {
    /// Staged paths, `/tmp/<name>`
    pub sources: Vec<String>,
    /// Target bucket
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

fn default_bucket() -> String {
    BUCKET_IMAGES.to_string()
}

/// Response of POST /uploads/promote
#[derive(Debug, Serialize, Deserialize)]
pub struct PromotedUploads {
    pub sources: Vec<String>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(ErrorCode::PayloadTooLarge, err.body_text())
    } else {
        ApiError::bad_request(err.body_text())
    }
}

/// Token of a staged upload path, `/tmp/<32 lowercase hex>`
fn staged_token(src: &str) -> Option<&str> {
    src.strip_prefix('/')?
        .strip_prefix(BUCKET_TMP)?
        .strip_prefix('/')
        .filter(|name| is_token(name))
}

fn is_token(name: &str) -> bool {
    name.len() == 32 && name.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn log_residue(failures: &[CleanupError]) {
    for failure in failures {
        warn!(error = %failure, "Rollback cleanup failed");
    }
}

async fn stage_fields(
    batch: &mut UploadBatch,
    multipart: &mut Multipart,
) -> Result<Vec<StoredObject>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        // plain form fields carry no file
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await.map_err(multipart_error)?;
        files.push(batch.stage(BUCKET_TMP, data, Some(&file_name)).await?);
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No files in request"));
    }
    Ok(files)
}

/// POST /uploads - Stage every file field into the tmp bucket
pub async fn stage_uploads(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut batch = UploadBatch::new(state.scope.clone());

    match stage_fields(&mut batch, &mut multipart).await {
        Ok(files) => {
            batch.commit();
            info!(count = files.len(), "Staged uploads");
            Ok((StatusCode::OK, Json(StagedUploads { files })).into_response())
        }
        Err(e) => {
            log_residue(&batch.rollback().await);
            Err(e)
        }
    }
}

/// POST /uploads/promote - Move staged files into a permanent bucket
pub async fn promote_uploads(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PromoteRequest>,
) -> Result<Response, ApiError> {
    let bucket = sanitize(&request.bucket);
    if !PROMOTION_BUCKETS.contains(&bucket.as_str()) {
        return Err(ApiError::bad_request(format!("Unknown bucket: {}", bucket)));
    }

    if let Some(bad) = request.sources.iter().find(|s| staged_token(s).is_none()) {
        return Err(ApiError::bad_request(format!("Not a staged upload: {}", bad)));
    }

    let mut batch = UploadBatch::new(state.scope.clone());
    let mut promoted = Vec::with_capacity(request.sources.len());

    for src in &request.sources {
        match batch.promote(src, &bucket).await {
            Ok(to) => promoted.push(to),
            Err(e) => {
                log_residue(&batch.rollback().await);
                return Err(e.into());
            }
        }
    }

    batch.commit();
    info!(count = promoted.len(), bucket = %bucket, "Promoted uploads");
    Ok((StatusCode::OK, Json(PromotedUploads { sources: promoted })).into_response())
}

/// DELETE /uploads/{name} - Discard a staged file
pub async fn discard_upload(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !is_token(&name) {
        return Err(ApiError::bad_request(format!("Not a staged upload: {}", name)));
    }
    let src = format!("/{}/{}", BUCKET_TMP, name);
    // best-effort; unlink already logs failures
    let _ = state.scope.unlink(&src).await;
    Ok(StatusCode::NO_CONTENT)
}
