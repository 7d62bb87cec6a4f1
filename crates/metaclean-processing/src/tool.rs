//! Metadata tool adapter
//!
//! `MetadataTool` is the seam between request handling and the external binary that
//! reads and strips embedded metadata. `ExifTool` drives the real `exiftool` CLI.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use metaclean_core::{AppError, MetadataReport};
use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Tool exited with status {status:?}: {stderr}")]
    Failed { status: Option<i32>, stderr: String },

    #[error("Tool timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Tool produced no output file at {0}")]
    MissingOutput(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ToolError {
    /// Diagnostic text suitable for the `details` field of an error response.
    pub fn diagnostic(&self) -> String {
        match self {
            ToolError::Failed { status, stderr } => {
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    match status {
                        Some(code) => format!("exit status {}", code),
                        None => "terminated by signal".to_string(),
                    }
                } else {
                    stderr.to_string()
                }
            }
            other => other.to_string(),
        }
    }
}

impl From<ToolError> for AppError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::Io(e) => AppError::InternalWithSource {
                message: "Tool I/O error".to_string(),
                source: e.into(),
            },
            other => AppError::tool_failure(other.diagnostic()),
        }
    }
}

#[async_trait]
pub trait MetadataTool: Send + Sync {
    /// Short name for logs and the deep health probe
    fn name(&self) -> &str;

    /// Read the metadata of `path` without modifying it.
    async fn extract(&self, path: &Path) -> Result<MetadataReport, ToolError>;

    /// Write a copy of `input` with all metadata removed to `output`.
    ///
    /// On error nothing is left at `output`.
    async fn strip(&self, input: &Path, output: &Path) -> Result<(), ToolError>;

    async fn version(&self) -> Result<String, ToolError>;
}

pub struct ExifTool {
    program: String,
    leading_args: Vec<String>,
    timeout: Duration,
}

impl ExifTool {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout,
        }
    }

    /// Arguments placed before every invocation's own arguments, e.g. a script
    /// path when `program` is an interpreter.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, args: &[&OsStr]) -> Result<Output, ToolError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(source)) => Err(ToolError::Spawn {
                program: self.program.clone(),
                source,
            }),
            Err(_) => Err(ToolError::TimedOut(self.timeout)),
        }
    }
}

async fn remove_if_exists(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove tool output")
        }
    }
}

#[async_trait]
impl MetadataTool for ExifTool {
    fn name(&self) -> &str {
        "exiftool"
    }

    #[tracing::instrument(skip(self), fields(program = %self.program))]
    async fn extract(&self, path: &Path) -> Result<MetadataReport, ToolError> {
        let output = self.run(&[OsStr::new("-s"), path.as_os_str()]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if stdout.trim().is_empty() {
                return Err(ToolError::Failed {
                    status: output.status.code(),
                    stderr,
                });
            }
            // exiftool exits non-zero on minor warnings but still prints what it read
            tracing::warn!(
                status = ?output.status.code(),
                stderr = %stderr.trim(),
                "exiftool reported an error during extraction"
            );
        }

        Ok(MetadataReport::from_tool_output(stdout.into_owned()))
    }

    #[tracing::instrument(skip(self), fields(program = %self.program))]
    async fn strip(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        // exiftool refuses to overwrite an existing -o target
        remove_if_exists(output).await;

        let result = self
            .run(&[
                OsStr::new("-all="),
                OsStr::new("-o"),
                output.as_os_str(),
                input.as_os_str(),
            ])
            .await;

        let out = match result {
            Ok(out) => out,
            Err(e) => {
                remove_if_exists(output).await;
                return Err(e);
            }
        };

        if !out.status.success() {
            remove_if_exists(output).await;
            return Err(ToolError::Failed {
                status: out.status.code(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            });
        }

        if !tokio::fs::try_exists(output).await? {
            return Err(ToolError::MissingOutput(output.to_path_buf()));
        }

        Ok(())
    }

    async fn version(&self) -> Result<String, ToolError> {
        let output = self.run(&[OsStr::new("-ver")]).await?;
        if !output.status.success() {
            return Err(ToolError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
