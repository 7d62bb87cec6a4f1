//! Multipart upload extraction

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::Multipart;
use axum::http::StatusCode;
use metaclean_core::{AppError, UploadedFile};

/// Name of the form field carrying the upload
pub const FILE_FIELD: &str = "file";

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart: {}", e.body_text()))
    }
}

/// A body that is not multipart at all is treated the same as a form without a file.
pub fn rejection_to_error(rejection: MultipartRejection) -> AppError {
    tracing::debug!(error = %rejection.body_text(), "Multipart rejected");
    AppError::BadRequest("no file".to_string())
}

/// Extract the single `file` field from a multipart form.
/// Other fields are ignored; a second `file` field is rejected.
pub async fn extract_multipart_file(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedFile, AppError> {
    let mut multipart = multipart.map_err(rejection_to_error)?;
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if upload.is_some() {
            return Err(AppError::BadRequest(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
        let data = field.bytes().await.map_err(multipart_error)?;

        upload = Some(UploadedFile::new(filename, data.to_vec()));
    }

    upload.ok_or_else(|| AppError::BadRequest("no file".to_string()))
}
