//! Binary-over-JSON transport encoding (standard, padded base64)

use base64::{engine::general_purpose::STANDARD, Engine as _};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid base64 payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),
}

pub fn encode_payload(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_payload(text: &str) -> Result<Vec<u8>, TransportError> {
    Ok(STANDARD.decode(text.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_byte_value() {
        let all: Vec<u8> = (0u8..=255).cycle().take(1024 + 7).collect();
        let encoded = encode_payload(&all);
        assert!(encoded.is_ascii());
        assert_eq!(decode_payload(&encoded).unwrap(), all);
    }

    #[test]
    fn round_trips_empty_payload() {
        assert_eq!(encode_payload(&[]), "");
        assert!(decode_payload("").unwrap().is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_payload("@@@@").is_err());
    }
}
