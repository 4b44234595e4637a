//! Byte-range media route

use crate::{ApiError, AppState};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;
use waypost_store::{sniff, ContentSource, StoreError, StreamOptions};

/// GET /files/{*path} - Serve an object, honoring a `Range` header
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let store = &state.files;

    let stat = store.stat(&path).await?;
    if !stat.is_file {
        return Err(StoreError::NotFound(format!("/{}", path.trim_start_matches('/'))).into());
    }

    // opaque bytes still count as a range, and fail to parse as one
    let range_header = headers
        .get(header::RANGE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()));

    let response = match range_header {
        Some(range) => {
            let range = store.content_range(Some(range.as_ref()), stat.size)?;
            let content_type = store.content_type(ContentSource::Path(&path)).await?;
            let stream = store.stream(&path, StreamOptions::from(&range)).await?;

            tracing::debug!(path = %path, range = %range, "Serving partial content");

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_RANGE, range.header_value())
                .header(header::CONTENT_LENGTH, range.chunk_size.to_string())
                .header(header::ACCEPT_RANGES, "bytes")
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from_stream(stream.into_byte_stream()))
        }
        None => {
            let mut stream = store.stream(&path, StreamOptions::default()).await?;
            // sniffed bytes are replayed into the body
            let content_type = match sniff::from_extension(&path) {
                Some(mime) => mime,
                None => {
                    store
                        .content_type(ContentSource::Stream(&mut stream))
                        .await?
                }
            };

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_LENGTH, stat.size.to_string())
                .header(header::ACCEPT_RANGES, "bytes")
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from_stream(stream.into_byte_stream()))
        }
    };

    response.map_err(|e| ApiError::Internal(e.to_string()))
}
