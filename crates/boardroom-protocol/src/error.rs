//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire events.
///
/// A decode failure on an inbound frame is not fatal: the connection
/// handler logs it and keeps reading, the same way an illegal move is
/// simply ignored.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization of an outbound event failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The inbound frame is not a well-formed client event.
    ///
    /// Common causes: not JSON at all, an unknown `event` name, or a
    /// `move` without its coordinate pair.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
