//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire messages.
///
/// Protocol errors never reach a client: a frame that fails to decode is
/// dropped, and an encode failure is logged by the caller.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into text).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed: malformed JSON, or JSON that is not an
    /// array of action objects.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
