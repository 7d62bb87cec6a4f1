//! Metaclean API Library
//!
//! HTTP surface of the cleaner: handlers, the shared-key guard, and application setup.

mod handlers;
mod utils;

pub mod auth;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use services::SanitizationService;
pub use state::AppState;
