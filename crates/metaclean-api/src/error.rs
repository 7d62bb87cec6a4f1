//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`; anything convertible into `AppError`
//! renders as an `ErrorBody` with the status from `ErrorMetadata`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metaclean_core::{AppError, ErrorBody, ErrorMetadata, LogLevel};
use metaclean_processing::{ToolError, ValidationError, WorkspaceError};

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rule: neither the trait nor the type is local to this crate)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(err.into())
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<ToolError> for HttpAppError {
    fn from(err: ToolError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<WorkspaceError> for HttpAppError {
    fn from(err: WorkspaceError) -> Self {
        HttpAppError(err.into())
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let message = error.detailed_message();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %message, error_type = error_type, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %message, error_type = error_type, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(error = %message, error_type = error_type, "Request failed");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

/// Build the response body. Tool diagnostics are always included; other details only
/// outside production and never for sensitive errors.
pub fn error_body(error: &AppError, is_production: bool) -> ErrorBody {
    let details = match error.diagnostic() {
        Some(diagnostic) => Some(diagnostic),
        None if !is_production && !error.is_sensitive() => Some(error.detailed_message()),
        None => None,
    };

    ErrorBody {
        error: error.client_message(),
        code: error.error_code().to_string(),
        recoverable: error.is_recoverable(),
        details,
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(error_body(app_error, is_production_env()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failure_always_has_details() {
        let err = AppError::tool_failure("Error: Not a valid JPG");
        let body = error_body(&err, true);
        assert_eq!(body.error, "failed to clean file");
        assert_eq!(body.code, "TOOL_FAILURE");
        assert_eq!(body.details.as_deref(), Some("Error: Not a valid JPG"));
    }

    #[test]
    fn unauthorized_never_has_details() {
        let body = error_body(&AppError::Unauthorized, false);
        assert_eq!(body.error, "Unauthorized");
        assert!(body.details.is_none());
    }

    #[test]
    fn bad_request_details_hidden_in_production() {
        let err = AppError::UnsupportedType("extension \"txt\" not in png".into());
        assert!(error_body(&err, false).details.is_some());
        let body = error_body(&err, true);
        assert_eq!(body.error, "filetype not allowed");
        assert!(body.details.is_none());
    }

    #[test]
    fn internal_errors_stay_opaque() {
        let err = AppError::Internal("disk full at /var/tmp".into());
        let body = error_body(&err, false);
        assert_eq!(body.error, "Internal server error");
        assert!(body.details.is_none());
        assert!(body.recoverable);
    }

    #[test]
    fn status_codes() {
        let response = HttpAppError(AppError::PayloadTooLarge("big".into())).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let response = HttpAppError(AppError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
