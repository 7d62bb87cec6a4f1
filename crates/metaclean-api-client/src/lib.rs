//! HTTP client for the metaclean cleaner service.
//!
//! `ApiClient` wraps the four endpoints with a bounded timeout and the shared-key
//! header. `CleanWorkflow` drives the two-phase upload/clean flow used by front ends.

pub mod api;
pub mod error;
pub mod orchestrator;

use std::time::Duration;

use metaclean_core::config::API_KEY_SECRET;
use metaclean_core::{EnvSecrets, ErrorBody, LayeredSecrets, SecretProvider};
use reqwest::Client;
use serde::de::DeserializeOwned;

pub use error::ClientError;
pub use orchestrator::{CleanOutcome, CleanWorkflow, UploadOutcome};

pub const DEFAULT_CLEANER_URL: &str = "http://metacleaner-cleaner:5001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const API_KEY_HEADER: &str = "x-api-key";

/// HTTP client for the cleaner service.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    /// `api_key: None` sends no key header (for cleaners running in open mode).
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    /// Create client from environment: CLEANER_URL, CLEANER_TIMEOUT_SECS, and the
    /// CLEANER_API_KEY secret (mounted file first, then environment).
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(&LayeredSecrets::from_env(), &EnvSecrets)
    }

    pub fn from_lookup(
        secrets: &dyn SecretProvider,
        vars: &dyn SecretProvider,
    ) -> Result<Self, ClientError> {
        let base_url = vars
            .lookup("CLEANER_URL")
            .unwrap_or_else(|| DEFAULT_CLEANER_URL.to_string());
        let timeout_secs = vars
            .lookup("CLEANER_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let api_key = secrets.lookup(API_KEY_SECRET);

        if api_key.is_none() {
            tracing::warn!("No {} found; requests will be sent without a key", API_KEY_SECRET);
        }

        Self::new(base_url, api_key, Duration::from_secs(timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key.as_str()),
            None => request,
        }
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.apply_auth(self.client.get(self.build_url(path)));
        let response = request.send().await?;
        decode_response(response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ClientError> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).multipart(form));
        let response = request.send().await?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let body: Option<ErrorBody> = serde_json::from_str(&text).ok();
        let message = match &body {
            Some(body) => body.error.clone(),
            None => text,
        };
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
            body,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

// Re-export wire types for convenience.
pub use metaclean_core::{
    CleanResponse, DeepHealthResponse, HealthResponse, HighlightedReport, MetadataReport,
    MetadataResponse,
};
