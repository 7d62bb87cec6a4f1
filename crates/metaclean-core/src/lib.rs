//! Metaclean Core Library
//!
//! This crate provides the domain models, error types, configuration, secret lookup,
//! transport encoding and the before/after highlight engine shared by the cleaner
//! service and its clients.

pub mod config;
pub mod error;
pub mod highlight;
pub mod models;
pub mod secrets;
pub mod transport;

// Re-export commonly used types
pub use config::{Config, DbCredentials, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use highlight::{highlight_removed, HighlightedLine, HighlightedReport};
pub use models::{
    CleanResponse, CleanResult, DeepHealthResponse, ErrorBody, HealthResponse, MetadataReport,
    MetadataResponse, UploadedFile,
};
pub use secrets::{EnvSecrets, LayeredSecrets, MountedSecrets, SecretProvider, StaticSecrets};
pub use transport::{decode_payload, encode_payload, TransportError};
