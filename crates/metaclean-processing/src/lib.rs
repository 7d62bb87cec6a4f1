//! Metaclean Processing Library
//!
//! File handling for the cleaner: upload validation, per-request workspaces and
//! the adapter around the external metadata tool.

pub mod tool;
pub mod validator;
pub mod workspace;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use tool::{ExifTool, MetadataTool, ToolError};
pub use validator::{disk_name, sanitize_filename, UploadPolicy, ValidationError};
pub use workspace::{Workspace, WorkspaceError};
