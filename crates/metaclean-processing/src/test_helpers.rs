//! Test helpers for exercising the cleaner without a real exiftool
//!
//! `FakeTool` treats every line of the file that starts with `@` as a metadata tag.
//! Extraction prints those lines without the `@`; stripping copies the file minus
//! those lines.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use metaclean_core::MetadataReport;

use crate::tool::{MetadataTool, ToolError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Extract(PathBuf),
    Strip { input: PathBuf, output: PathBuf },
}

#[derive(Clone, Default)]
pub struct FakeTool {
    calls: Arc<Mutex<Vec<FakeCall>>>,
    strip_error: Option<String>,
    extract_fails: bool,
    unavailable: bool,
}

impl FakeTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every strip fail with `stderr` as the diagnostic.
    pub fn failing_strip(mut self, stderr: impl Into<String>) -> Self {
        self.strip_error = Some(stderr.into());
        self
    }

    /// Make every extraction fail as if the tool crashed.
    pub fn failing_extract(mut self) -> Self {
        self.extract_fails = true;
        self
    }

    /// Behave as if the binary were missing.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Every path the tool was handed, inputs and outputs.
    pub fn touched_paths(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .flat_map(|c| match c {
                FakeCall::Extract(p) => vec![p],
                FakeCall::Strip { input, output } => vec![input, output],
            })
            .collect()
    }

    fn spawn_error(&self) -> ToolError {
        ToolError::Spawn {
            program: "fake-exiftool".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
        }
    }
}

#[async_trait]
impl MetadataTool for FakeTool {
    fn name(&self) -> &str {
        "fake-exiftool"
    }

    async fn extract(&self, path: &Path) -> Result<MetadataReport, ToolError> {
        self.calls
            .lock()
            .unwrap()
            .push(FakeCall::Extract(path.to_path_buf()));
        if self.unavailable {
            return Err(self.spawn_error());
        }
        if self.extract_fails {
            return Err(ToolError::Failed {
                status: Some(1),
                stderr: "extraction crashed".to_string(),
            });
        }

        let bytes = tokio::fs::read(path).await?;
        let text = String::from_utf8_lossy(&bytes);
        let tags: Vec<&str> = text
            .lines()
            .filter_map(|l| l.strip_prefix('@'))
            .collect();
        Ok(MetadataReport::from_tool_output(tags.join("\n")))
    }

    async fn strip(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.calls.lock().unwrap().push(FakeCall::Strip {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });
        if self.unavailable {
            return Err(self.spawn_error());
        }
        if let Some(stderr) = &self.strip_error {
            return Err(ToolError::Failed {
                status: Some(1),
                stderr: stderr.clone(),
            });
        }

        let bytes = tokio::fs::read(input).await?;
        let text = String::from_utf8_lossy(&bytes);
        let kept: Vec<&str> = text.lines().filter(|l| !l.starts_with('@')).collect();
        tokio::fs::write(output, kept.join("\n")).await?;
        Ok(())
    }

    async fn version(&self) -> Result<String, ToolError> {
        if self.unavailable {
            return Err(self.spawn_error());
        }
        Ok("0.0-fake".to_string())
    }
}

/// A fake image whose metadata `FakeTool` reports as `tags`.
pub fn tagged_file(tags: &[&str]) -> Vec<u8> {
    let mut lines = vec!["PIXELS".to_string()];
    lines.extend(tags.iter().map(|t| format!("@{}", t)));
    lines.join("\n").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_tool_extracts_and_strips_tags() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.jpg");
        let output = dir.path().join("cleaned_a.jpg");
        std::fs::write(&input, tagged_file(&["Make : Canon", "GPS : 1,2"])).unwrap();

        let tool = FakeTool::new();
        let before = tool.extract(&input).await.unwrap();
        assert_eq!(before.lines().collect::<Vec<_>>(), vec!["Make : Canon", "GPS : 1,2"]);

        tool.strip(&input, &output).await.unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"PIXELS");
        assert!(tool.extract(&output).await.unwrap().is_empty());
        assert_eq!(tool.calls().len(), 3);
    }
}
