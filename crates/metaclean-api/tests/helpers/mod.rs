//! Shared setup for service integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use metaclean_api::setup::routes::setup_routes;
use metaclean_api::AppState;
use metaclean_core::Config;
use metaclean_processing::test_helpers::FakeTool;
use tempfile::TempDir;

pub const API_KEY: &str = "test-key-0123456789";

pub struct TestApp {
    pub server: TestServer,
    pub tool: FakeTool,
    pub workspace_root: TempDir,
}

impl TestApp {
    /// Open mode, default limits
    pub fn new() -> Self {
        Self::with(FakeTool::new(), |_| {})
    }

    pub fn with_key() -> Self {
        Self::with(FakeTool::new(), |c| c.api_key = Some(API_KEY.to_string()))
    }

    pub fn with(tool: FakeTool, configure: impl FnOnce(&mut Config)) -> Self {
        let workspace_root = tempfile::tempdir().expect("Failed to create workspace root");
        let mut config = Config {
            workspace_root: Some(workspace_root.path().to_path_buf()),
            ..Config::default()
        };
        configure(&mut config);

        let state = AppState::new(config.clone(), Arc::new(tool.clone()));
        let app = setup_routes(&config, state).expect("Failed to build routes");
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            tool,
            workspace_root,
        }
    }

    /// No request may leave anything behind in the workspace root.
    pub fn workspace_is_empty(&self) -> bool {
        std::fs::read_dir(self.workspace_root.path())
            .expect("workspace root readable")
            .next()
            .is_none()
    }
}

pub fn file_form(name: &str, bytes: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(bytes).file_name(name))
}
