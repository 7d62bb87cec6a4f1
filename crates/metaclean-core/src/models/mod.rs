//! Domain models
//!
//! Request/response schemas are defined once here and shared by the service and
//! its HTTP client.

pub mod report;
pub mod responses;
pub mod upload;

pub use report::{MetadataReport, NO_METADATA};
pub use responses::{
    CleanResponse, CleanResult, DeepHealthResponse, ErrorBody, HealthResponse, MetadataResponse,
};
pub use upload::{file_extension, is_allowed_extension, UploadedFile, ALLOWED_EXTENSIONS};
