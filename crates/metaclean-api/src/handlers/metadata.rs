use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use metaclean_core::MetadataResponse;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

/// `POST /metadata`: report embedded metadata without modifying the file.
///
/// # Errors
/// - `AppError::BadRequest` - no `file` field or an empty filename
/// - `AppError::UnsupportedType` - extension not allowed
/// - `AppError::PayloadTooLarge` - file exceeds the size limit
#[tracing::instrument(skip(state, multipart), fields(operation = "metadata"))]
pub async fn extract_metadata(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MetadataResponse>, HttpAppError> {
    let file = extract_multipart_file(multipart).await?;
    let report = state.sanitizer.metadata(&file).await?;

    Ok(Json(MetadataResponse::new(file.name, &report)))
}
