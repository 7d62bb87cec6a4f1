//! Metadata inspection and stripping for a single upload
//!
//! Each call validates the upload, creates one private workspace, runs the tool and
//! drops the workspace before returning, whatever the outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use metaclean_core::{AppError, CleanResult, MetadataReport, UploadedFile};
use metaclean_processing::{disk_name, MetadataTool, ToolError, UploadPolicy, Workspace};

pub struct SanitizationService {
    tool: Arc<dyn MetadataTool>,
    policy: UploadPolicy,
    workspace_root: Option<PathBuf>,
}

impl SanitizationService {
    pub fn new(
        tool: Arc<dyn MetadataTool>,
        policy: UploadPolicy,
        workspace_root: Option<PathBuf>,
    ) -> Self {
        Self {
            tool,
            policy,
            workspace_root,
        }
    }

    pub fn tool_name(&self) -> &str {
        self.tool.name()
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub async fn tool_version(&self) -> Result<String, ToolError> {
        self.tool.version().await
    }

    /// Report the metadata of an upload without changing it.
    #[tracing::instrument(skip(self, file), fields(filename = %file.name, size = file.size()))]
    pub async fn metadata(&self, file: &UploadedFile) -> Result<MetadataReport, AppError> {
        let extension = self.policy.validate(file)?;

        let workspace = Workspace::create(self.workspace_root.as_deref())?;
        let input = workspace
            .write_input(&disk_name(&file.name, &extension), &file.bytes)
            .await?;

        let report = self.extract_or_empty(&input).await;
        close(workspace);

        tracing::debug!(lines = report.lines().count(), "Metadata extracted");
        Ok(report)
    }

    /// Strip all metadata from an upload and report what is left afterwards.
    #[tracing::instrument(skip(self, file), fields(filename = %file.name, size = file.size()))]
    pub async fn clean(&self, file: UploadedFile) -> Result<CleanResult, AppError> {
        let extension = self.policy.validate(&file)?;
        let name = disk_name(&file.name, &extension);

        let workspace = Workspace::create(self.workspace_root.as_deref())?;
        let input = workspace.write_input(&name, &file.bytes).await?;
        let output = workspace.output_path(&name);

        if let Err(e) = self.tool.strip(&input, &output).await {
            tracing::error!(tool = self.tool.name(), error = %e, "Stripping failed");
            return Err(e.into());
        }

        let after_report = self.extract_or_empty(&output).await;
        let cleaned_bytes = workspace.read(&output).await?;
        close(workspace);

        tracing::info!(
            size_before = file.size(),
            size_after = cleaned_bytes.len(),
            remaining_lines = after_report.lines().count(),
            "File cleaned"
        );

        Ok(CleanResult {
            source_filename: file.name,
            cleaned_bytes,
            after_report,
        })
    }

    /// Extraction failures never fail a request; they read as "no metadata".
    async fn extract_or_empty(&self, path: &Path) -> MetadataReport {
        match self.tool.extract(path).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(
                    tool = self.tool.name(),
                    error = %e,
                    "Metadata extraction failed, reporting no metadata"
                );
                MetadataReport::empty()
            }
        }
    }
}

fn close(workspace: Workspace) {
    if let Err(e) = workspace.close() {
        tracing::warn!(error = %e, "Workspace cleanup failed");
    }
}
