//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. When you see a
//! `ProtocolError`, the problem is in the shape of a message, not in the
//! rules of the game or the state of a room.

/// Errors that can occur while encoding, decoding, or routing a message.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The bytes are not a well-formed envelope.
    ///
    /// Raised before the `contextId` is known, so nobody can be told.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The `type` tag is not in the registry.
    #[error("unknown request type: {0}")]
    UnknownRequestType(String),

    /// The envelope was fine but `data` does not fit the request's
    /// schema (missing required field, wrong JSON type, ...).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}
