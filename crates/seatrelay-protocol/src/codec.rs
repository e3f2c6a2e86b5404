//! Codec trait and the JSON implementation.
//!
//! The server core deals in typed messages; a [`Codec`] turns them into
//! frame text and back. Clients of the relay speak JSON, so [`JsonCodec`]
//! is the only implementation, but the handler is written against the
//! trait.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust values to frame text and decode frames
/// back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into frame text.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a received frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use seatrelay_protocol::{ActionBatch, ClientAction, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let batch: ActionBatch = codec
///     .decode(br#"[{"action":"READY_UP","id":"AB12"}]"#)
///     .unwrap();
/// assert!(matches!(batch.actions()[0], ClientAction::ReadyUp { .. }));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
