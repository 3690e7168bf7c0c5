//! # Export Formats
//!
//! Serialization of decoded values (auth messages, comparison reports) for
//! exchange with other protocol implementations and diffing tools.
//!
//! ## Formats
//! - **Bincode**: compact binary, for fixtures stored next to captures
//! - **JSON**: human-readable, for reports and cross-language tooling
//!
//! ## Usage
//! ```ignore
//! use tns_wire::core::serialization::{ExportFormat, MultiFormat};
//!
//! let json = message.serialize_format(ExportFormat::Json)?;
//! let (recovered, format) = AuthMessage::deserialize_with_header(&framed)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Binary compact format (default)
    #[default]
    Bincode,
    /// Human-readable JSON format
    Json,
}

impl ExportFormat {
    /// Get the format identifier byte
    pub fn format_byte(self) -> u8 {
        match self {
            ExportFormat::Bincode => 0x01,
            ExportFormat::Json => 0x02,
        }
    }

    /// Detect format from identifier byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(ExportFormat::Bincode),
            0x02 => Some(ExportFormat::Json),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Bincode => "Bincode",
            ExportFormat::Json => "JSON",
        }
    }
}

/// Trait for types that can be exported in every [`ExportFormat`]
pub trait MultiFormat: Serialize + for<'de> Deserialize<'de> + Sized {
    fn serialize_format(&self, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Bincode => {
                bincode::serialize(self).map_err(|e| WireError::SerializeError(e.to_string()))
            }
            ExportFormat::Json => {
                serde_json::to_vec(self).map_err(|e| WireError::SerializeError(e.to_string()))
            }
        }
    }

    /// Serialize with a leading format byte
    fn serialize_with_header(&self, format: ExportFormat) -> Result<Vec<u8>> {
        let mut data = vec![format.format_byte()];
        data.append(&mut self.serialize_format(format)?);
        Ok(data)
    }

    fn deserialize_format(data: &[u8], format: ExportFormat) -> Result<Self> {
        match format {
            ExportFormat::Bincode => bincode::deserialize(data)
                .map_err(|e| WireError::DeserializeError(e.to_string())),
            ExportFormat::Json => serde_json::from_slice(data)
                .map_err(|e| WireError::DeserializeError(e.to_string())),
        }
    }

    /// Deserialize data produced by [`MultiFormat::serialize_with_header`]
    fn deserialize_with_header(data: &[u8]) -> Result<(Self, ExportFormat)> {
        let (&first, payload) = data
            .split_first()
            .ok_or_else(|| WireError::DeserializeError("Empty data".to_string()))?;

        let format = ExportFormat::from_byte(first).ok_or_else(|| {
            WireError::DeserializeError(format!("Unknown format byte: {first}"))
        })?;

        let value = Self::deserialize_format(payload, format)?;
        Ok((value, format))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::protocol::auth::{AuthMessage, KeyValuePair};

    fn sample() -> AuthMessage {
        AuthMessage::phase_one("scott", vec![KeyValuePair::new("AUTH_TERMINAL", "pts/0", 0)])
    }

    #[test]
    fn test_format_byte_roundtrip() {
        for format in [ExportFormat::Bincode, ExportFormat::Json] {
            let recovered = ExportFormat::from_byte(format.format_byte()).expect("valid byte");
            assert_eq!(format, recovered);
        }
        assert_eq!(ExportFormat::from_byte(0x7F), None);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ExportFormat::Bincode.name(), "Bincode");
        assert_eq!(ExportFormat::Json.name(), "JSON");
        assert_eq!(ExportFormat::default(), ExportFormat::Bincode);
    }

    #[test]
    fn test_header_roundtrip_each_format() {
        let msg = sample();
        for format in [ExportFormat::Bincode, ExportFormat::Json] {
            let data = msg.serialize_with_header(format).expect("serialize");
            let (recovered, detected) =
                AuthMessage::deserialize_with_header(&data).expect("deserialize");
            assert_eq!(detected, format);
            assert_eq!(recovered, msg);
        }
    }

    #[test]
    fn test_json_is_readable() {
        let json = sample()
            .serialize_format(ExportFormat::Json)
            .expect("serialize");
        let text = std::str::from_utf8(&json).expect("utf8");
        assert!(text.contains("\"AUTH_TERMINAL\""));
    }

    #[test]
    fn test_rejects_empty_and_unknown() {
        assert!(AuthMessage::deserialize_with_header(&[]).is_err());
        assert!(AuthMessage::deserialize_with_header(&[0x09, 1, 2]).is_err());
    }
}
