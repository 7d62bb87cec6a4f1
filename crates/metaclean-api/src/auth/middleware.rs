use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metaclean_core::AppError;
use subtle::ConstantTimeEq;

use crate::error::HttpAppError;

/// Header carrying the shared secret (header names are case-insensitive)
pub const API_KEY_HEADER: &str = "X-API-KEY";

#[derive(Clone, Debug)]
pub struct AuthState {
    api_key: Option<String>,
}

impl AuthState {
    /// `None` disables the check (open mode).
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn authorize(&self, supplied: Option<&str>) -> bool {
        match (&self.api_key, supplied) {
            (None, _) => true,
            (Some(expected), Some(supplied)) => secure_compare(supplied, expected),
            (Some(_), None) => false,
        }
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Shared-key guard for the file endpoints. Runs before the body is read.
pub async fn api_key_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let supplied = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    if auth_state.authorize(supplied) {
        return next.run(request).await;
    }

    tracing::warn!(
        path = %request.uri().path(),
        key_present = supplied.is_some(),
        "Rejected request with missing or invalid API key"
    );
    HttpAppError(AppError::Unauthorized).into_response()
}
