use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use metaclean_core::CleanResponse;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

/// `POST /clean`: strip all metadata and return the cleaned bytes (base64) together
/// with whatever metadata the tool still reports afterwards.
///
/// # Errors
/// - `AppError::BadRequest` - no `file` field or an empty filename
/// - `AppError::UnsupportedType` - extension not allowed
/// - `AppError::PayloadTooLarge` - file exceeds the size limit
/// - `AppError::ToolFailure` - the tool could not strip the file; `details` has its stderr
#[tracing::instrument(skip(state, multipart), fields(operation = "clean"))]
pub async fn clean_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CleanResponse>, HttpAppError> {
    let file = extract_multipart_file(multipart).await?;
    let result = state.sanitizer.clean(file).await?;

    Ok(Json(result.to_response()))
}
