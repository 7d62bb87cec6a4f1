//! Two-phase clean workflow for front ends
//!
//! `upload` shows what a file carries; `clean` fetches the stripped copy, stores it,
//! highlights what was removed and deletes the original upload.

use std::io;
use std::path::{Path, PathBuf};

use metaclean_core::models::upload::{is_allowed_extension, ALLOWED_EXTENSIONS};
use metaclean_core::{highlight_removed, HighlightedReport, MetadataReport};

use crate::api::upload_name;
use crate::{ApiClient, ClientError};

/// Result of the inspection phase
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub filename: String,
    pub before: MetadataReport,
    pub size_before: u64,
}

/// Result of the cleaning phase
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub filename: String,
    pub before_highlighted: HighlightedReport,
    pub after: MetadataReport,
    pub cleaned_path: PathBuf,
    pub size_before: u64,
    pub size_after: u64,
}

pub struct CleanWorkflow {
    client: ApiClient,
    allowed_extensions: Vec<String>,
}

impl CleanWorkflow {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_allowed_extensions(mut self, extensions: Vec<String>) -> Self {
        self.allowed_extensions = extensions;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    async fn read_checked(&self, path: &Path) -> Result<(String, Vec<u8>), ClientError> {
        let filename = upload_name(path)?;
        if !is_allowed_extension(&filename, &self.allowed_extensions) {
            return Err(ClientError::UnsupportedType(filename));
        }
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::io(path, e))?;
        Ok((filename, bytes))
    }

    /// Phase one: report the file's metadata. The file is left in place.
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    pub async fn upload(&self, path: &Path) -> Result<UploadOutcome, ClientError> {
        let (filename, bytes) = self.read_checked(path).await?;
        let size_before = bytes.len() as u64;

        let before = self.client.metadata(&filename, bytes).await?.report();
        tracing::info!(filename = %filename, lines = before.lines().count(), "Metadata fetched");

        Ok(UploadOutcome {
            filename,
            before,
            size_before,
        })
    }

    /// Phase two: clean the file at `path`, write the result to `cleaned_dir/<filename>`
    /// and delete `path`.
    ///
    /// On any error the original is kept so the caller can retry.
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    pub async fn clean(&self, path: &Path, cleaned_dir: &Path) -> Result<CleanOutcome, ClientError> {
        let (filename, bytes) = self.read_checked(path).await?;
        let size_before = bytes.len() as u64;

        let result = self.client.clean(&filename, bytes.clone()).await?.decode()?;

        // "before" is re-fetched rather than carried over from phase one. Nothing is
        // written until every request has succeeded.
        let before = self.client.metadata(&filename, bytes).await?.report();
        let before_highlighted = highlight_removed(&before, &result.after_report);

        tokio::fs::create_dir_all(cleaned_dir)
            .await
            .map_err(|e| ClientError::io(cleaned_dir, e))?;
        let cleaned_path = cleaned_dir.join(&filename);
        tokio::fs::write(&cleaned_path, &result.cleaned_bytes)
            .await
            .map_err(|e| ClientError::io(&cleaned_path, e))?;

        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to delete original upload")
            }
        }

        tracing::info!(
            filename = %filename,
            removed = before_highlighted.removed_count(),
            size_before,
            size_after = result.cleaned_bytes.len(),
            "File cleaned"
        );

        Ok(CleanOutcome {
            filename,
            before_highlighted,
            after: result.after_report,
            cleaned_path,
            size_before,
            size_after: result.cleaned_bytes.len() as u64,
        })
    }
}
