//! Per-request scratch directories
//!
//! A `Workspace` owns a uniquely named directory for the lifetime of one request.
//! The directory is removed when the value is dropped, which covers early returns,
//! panics and cancelled handler futures alike.

use std::io;
use std::path::{Path, PathBuf};

use metaclean_core::AppError;
use tempfile::TempDir;

use crate::validator::sanitize_filename;

const WORKSPACE_PREFIX: &str = "metaclean-";
const CLEANED_PREFIX: &str = "cleaned_";

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Failed to create workspace: {0}")]
    Create(#[source] io::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove workspace {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<WorkspaceError> for AppError {
    fn from(err: WorkspaceError) -> Self {
        AppError::InternalWithSource {
            message: "Workspace error".to_string(),
            source: err.into(),
        }
    }
}

#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Workspace {
    /// Create a private directory under `root`, or the system temp dir when `None`.
    pub fn create(root: Option<&Path>) -> Result<Self, WorkspaceError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(WorkspaceError::Create)?;

        let path = dir.path().to_path_buf();
        tracing::debug!(workspace = %path.display(), "Workspace created");

        Ok(Self {
            path,
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the input file for `name` after sanitization.
    pub fn input_path(&self, name: &str) -> PathBuf {
        self.path.join(sanitize_filename(name))
    }

    /// Path the stripped copy of `name` is written to: `cleaned_<sanitized>`.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.path
            .join(format!("{}{}", CLEANED_PREFIX, sanitize_filename(name)))
    }

    /// Write the uploaded bytes under the sanitized name and return the path.
    pub async fn write_input(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, WorkspaceError> {
        let path = self.input_path(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| WorkspaceError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, WorkspaceError> {
        tokio::fs::read(path)
            .await
            .map_err(|source| WorkspaceError::Read {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Delete the directory now, reporting failure instead of logging it.
    pub fn close(mut self) -> Result<(), WorkspaceError> {
        match self.dir.take() {
            Some(dir) => dir.close().map_err(|source| WorkspaceError::Cleanup {
                path: self.path.clone(),
                source,
            }),
            None => Ok(()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                tracing::warn!(
                    workspace = %self.path.display(),
                    error = %e,
                    "Failed to remove workspace"
                );
            } else {
                tracing::debug!(workspace = %self.path.display(), "Workspace removed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let ws = Workspace::create(Some(root.path())).unwrap();
            ws.write_input("photo.jpg", b"data").await.unwrap();
            assert!(ws.path().exists());
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn removed_when_body_errors() {
        let root = tempfile::tempdir().unwrap();

        async fn failing(root: &Path) -> Result<PathBuf, (PathBuf, &'static str)> {
            let ws = Workspace::create(Some(root)).map_err(|_| (PathBuf::new(), "create"))?;
            ws.write_input("a.png", b"x")
                .await
                .map_err(|_| (ws.path().to_path_buf(), "write"))?;
            Err((ws.path().to_path_buf(), "tool"))
        }

        let (path, stage) = failing(root.path()).await.unwrap_err();
        assert_eq!(stage, "tool");
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn close_removes_eagerly() {
        let ws = Workspace::create(None).unwrap();
        let path = ws.path().to_path_buf();
        ws.close().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn paths_are_sanitized_and_inside() {
        let ws = Workspace::create(None).unwrap();
        let input = ws.write_input("../../evil name.png", b"x").await.unwrap();
        assert_eq!(input, ws.path().join("evil_name.png"));
        assert_eq!(
            ws.output_path("../../evil name.png"),
            ws.path().join("cleaned_evil_name.png")
        );
        assert_eq!(ws.read(&input).await.unwrap(), b"x");
    }

    #[test]
    fn workspaces_are_unique() {
        let a = Workspace::create(None).unwrap();
        let b = Workspace::create(None).unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("metaclean-"));
    }
}
