//! Format-specific encoding and decoding (feature-gated).
//!
//! Provides [`encode`] and [`decode`] functions that convert between
//! serde-serializable types and byte buffers in RON or bincode format.

use serde::{Deserialize, Serialize};

use super::error::{DeserializeError, SerializeError};

#[cfg(not(any(feature = "serialize-ron", feature = "serialize-bincode")))]
compile_error!("enable at least one of the `serialize-ron` / `serialize-bincode` features");

/// Supported snapshot formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// RON (Rusty Object Notation), human-readable text.
    #[cfg(feature = "serialize-ron")]
    Ron,
    /// Bincode, compact binary.
    #[cfg(feature = "serialize-bincode")]
    Bincode,
}

impl Default for Format {
    #[cfg(feature = "serialize-bincode")]
    fn default() -> Self {
        Self::Bincode
    }

    #[cfg(not(feature = "serialize-bincode"))]
    fn default() -> Self {
        Self::Ron
    }
}

/// Encode a serde-serializable value to bytes in the given format.
pub fn encode<T: Serialize>(value: &T, format: Format) -> Result<Vec<u8>, SerializeError> {
    match format {
        #[cfg(feature = "serialize-ron")]
        Format::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
            .map(|s| s.into_bytes())
            .map_err(|e| SerializeError::FormatError(e.to_string())),
        #[cfg(feature = "serialize-bincode")]
        Format::Bincode => {
            bincode::serialize(value).map_err(|e| SerializeError::FormatError(e.to_string()))
        }
    }
}

/// Decode bytes in the given format to a serde-deserializable type.
pub fn decode<T: serde::de::DeserializeOwned>(
    bytes: &[u8],
    format: Format,
) -> Result<T, DeserializeError> {
    match format {
        #[cfg(feature = "serialize-ron")]
        Format::Ron => {
            let s = std::str::from_utf8(bytes)
                .map_err(|e| DeserializeError::FormatError(e.to_string()))?;
            ron::from_str(s).map_err(|e| DeserializeError::FormatError(e.to_string()))
        }
        #[cfg(feature = "serialize-bincode")]
        Format::Bincode => {
            bincode::deserialize(bytes).map_err(|e| DeserializeError::FormatError(e.to_string()))
        }
    }
}
