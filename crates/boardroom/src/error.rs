//! Unified error type for the Boardroom server.

use boardroom_game::GameError;
use boardroom_protocol::ProtocolError;
use boardroom_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BoardroomError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A game-level error (session unavailable, registration clash).
    #[error(transparent)]
    Game(#[from] GameError),

    /// The server was started with unusable settings.
    #[error("invalid configuration: {0}")]
    Config(String),
}
