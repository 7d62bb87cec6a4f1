//! Application state shared by all handlers

use std::sync::Arc;

use metaclean_core::Config;
use metaclean_processing::{MetadataTool, UploadPolicy};

use crate::services::SanitizationService;

pub struct AppState {
    pub config: Config,
    pub sanitizer: SanitizationService,
}

impl AppState {
    pub fn new(config: Config, tool: Arc<dyn MetadataTool>) -> Arc<Self> {
        let sanitizer = SanitizationService::new(
            tool,
            UploadPolicy::from_config(&config),
            config.workspace_root.clone(),
        );
        Arc::new(Self { config, sanitizer })
    }
}
