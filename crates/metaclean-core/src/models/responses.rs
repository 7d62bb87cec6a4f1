//! JSON response schemas for the cleaner endpoints

use serde::{Deserialize, Serialize};

use super::report::MetadataReport;
use crate::transport::{decode_payload, encode_payload, TransportError};

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// `GET /health/deep`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepHealthResponse {
    pub status: String,
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
}

/// `POST /metadata`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataResponse {
    /// Original, unsanitized name as uploaded
    pub filename: String,
    pub metadata: String,
}

impl MetadataResponse {
    pub fn new(filename: impl Into<String>, report: &MetadataReport) -> Self {
        Self {
            filename: filename.into(),
            metadata: report.as_wire_text().to_string(),
        }
    }

    pub fn report(&self) -> MetadataReport {
        MetadataReport::from_wire(&self.metadata)
    }
}

/// `POST /clean`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanResponse {
    pub filename: String,
    pub after_meta: String,
    pub cleaned_file_b64: String,
}

impl CleanResponse {
    /// Decode the transported payload back into a `CleanResult`.
    pub fn decode(&self) -> Result<CleanResult, TransportError> {
        Ok(CleanResult {
            source_filename: self.filename.clone(),
            cleaned_bytes: decode_payload(&self.cleaned_file_b64)?,
            after_report: MetadataReport::from_wire(&self.after_meta),
        })
    }
}

/// Outcome of a successful clean, before transport encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanResult {
    /// Echoed back unchanged from the upload
    pub source_filename: String,
    pub cleaned_bytes: Vec<u8>,
    pub after_report: MetadataReport,
}

impl CleanResult {
    pub fn to_response(&self) -> CleanResponse {
        CleanResponse {
            filename: self.source_filename.clone(),
            after_meta: self.after_report.as_wire_text().to_string(),
            cleaned_file_b64: encode_payload(&self.cleaned_bytes),
        }
    }
}

/// Body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_response_wire_shape() {
        let result = CleanResult {
            source_filename: "My Photo.jpg".to_string(),
            cleaned_bytes: vec![0xFF, 0xD8, 0x00],
            after_report: MetadataReport::empty(),
        };
        let json = serde_json::to_value(result.to_response()).unwrap();
        assert_eq!(json["filename"], "My Photo.jpg");
        assert_eq!(json["after_meta"], "No metadata");
        assert_eq!(json["cleaned_file_b64"], "/9gA");
    }

    #[test]
    fn clean_response_decodes_back() {
        let result = CleanResult {
            source_filename: "a.png".to_string(),
            cleaned_bytes: (0u8..=255).collect(),
            after_report: MetadataReport::from_tool_output("FileType : PNG\n"),
        };
        assert_eq!(result.to_response().decode().unwrap(), result);
    }

    #[test]
    fn corrupt_payload_is_a_transport_error() {
        let response = CleanResponse {
            filename: "a.png".to_string(),
            after_meta: "No metadata".to_string(),
            cleaned_file_b64: "not base64!".to_string(),
        };
        assert!(response.decode().is_err());
    }

    #[test]
    fn error_body_omits_missing_details() {
        let body = ErrorBody {
            error: "Unauthorized".to_string(),
            code: "UNAUTHORIZED".to_string(),
            recoverable: false,
            details: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("details").is_none());
        let parsed: ErrorBody = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, body);
    }
}
