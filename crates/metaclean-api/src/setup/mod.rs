//! Application setup and initialization

pub mod routes;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use metaclean_core::Config;
use metaclean_processing::{ExifTool, MetadataTool};

use crate::state::AppState;

/// Initialize the whole application: telemetry, the metadata tool, state and routes
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    metaclean_infra::init_telemetry(config.log_format, metaclean_infra::DEFAULT_FILTER)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        auth_enabled = config.auth_enabled(),
        "Configuration loaded and validated successfully"
    );

    let tool = ExifTool::new(
        config.exiftool_path.clone(),
        Duration::from_secs(config.tool_timeout_secs),
    );
    match tool.version().await {
        Ok(version) => tracing::info!(path = %tool.program(), version = %version, "exiftool found"),
        Err(e) => tracing::warn!(
            path = %tool.program(),
            error = %e,
            "exiftool not available; /clean will fail until it is installed"
        ),
    }

    let state = AppState::new(config.clone(), Arc::new(tool));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
