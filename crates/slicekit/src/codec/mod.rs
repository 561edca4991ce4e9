//! JSON codec collaborator backed by `serde_json`.
//!
//! The codec is an explicit value threaded through the dispatcher's
//! constructor rather than a process-wide default instance, so tests and
//! embedders control exactly which codec serves each pipeline.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised while encoding or decoding JSON payloads.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A value could not be serialised to JSON.
    #[error("failed to serialise value to JSON: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A JSON payload could not be deserialized into the target type.
    #[error("failed to deserialize JSON into {type_name}: {source}")]
    Deserialize {
        /// Name of the requested target type.
        type_name: &'static str,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
}

/// JSON serialisation service for request bodies and response payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Creates a codec with the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Serialises a value to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Serialize`] when the value cannot be encoded.
    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(CodecError::Serialize)
    }

    /// Deserializes a JSON string into the target type.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Deserialize`] naming the target type when
    /// parsing fails.
    pub fn deserialize<T: DeserializeOwned>(&self, json: &str) -> Result<T, CodecError> {
        serde_json::from_str(json).map_err(|source| CodecError::Deserialize {
            type_name: std::any::type_name::<T>(),
            source,
        })
    }

    /// Returns `true` when the input parses as JSON.
    #[must_use]
    pub fn is_valid(&self, json: &str) -> bool {
        serde_json::from_str::<serde_json::Value>(json).is_ok()
    }
}
