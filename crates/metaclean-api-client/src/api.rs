//! Endpoint methods for the cleaner client.

use std::path::Path;

use metaclean_core::{CleanResponse, DeepHealthResponse, HealthResponse, MetadataResponse};
use reqwest::multipart::{Form, Part};

use crate::{ApiClient, ClientError};

fn file_form(filename: &str, bytes: Vec<u8>) -> Form {
    Form::new().part("file", Part::bytes(bytes).file_name(filename.to_string()))
}

/// Final path component as UTF-8, used as the upload's filename.
pub(crate) fn upload_name(path: &Path) -> Result<String, ClientError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .ok_or_else(|| {
            ClientError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })
}

impl ApiClient {
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get("/health").await
    }

    /// 503 from the server surfaces as `ClientError::Status`.
    pub async fn deep_health(&self) -> Result<DeepHealthResponse, ClientError> {
        self.get("/health/deep").await
    }

    pub async fn metadata(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<MetadataResponse, ClientError> {
        tracing::debug!(filename, size = bytes.len(), "Requesting metadata");
        self.post_multipart("/metadata", file_form(filename, bytes))
            .await
    }

    pub async fn clean(&self, filename: &str, bytes: Vec<u8>) -> Result<CleanResponse, ClientError> {
        tracing::debug!(filename, size = bytes.len(), "Requesting clean");
        self.post_multipart("/clean", file_form(filename, bytes)).await
    }

    /// Read a local file and request its metadata.
    pub async fn metadata_file(&self, path: &Path) -> Result<MetadataResponse, ClientError> {
        let name = upload_name(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::io(path, e))?;
        self.metadata(&name, bytes).await
    }

    /// Read a local file and request a cleaned copy.
    pub async fn clean_file(&self, path: &Path) -> Result<CleanResponse, ClientError> {
        let name = upload_name(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::io(path, e))?;
        self.clean(&name, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_name_is_last_component() {
        assert_eq!(upload_name(Path::new("/tmp/up/photo.jpg")).unwrap(), "photo.jpg");
        assert!(upload_name(Path::new("/")).is_err());
    }
}
