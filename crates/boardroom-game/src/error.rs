//! Error types for the game layer.

use crate::SessionId;

/// Errors from session plumbing.
///
/// Game rule violations are not errors: an illegal move or a disconnect
/// is an ordinary input to the session state machine. These variants only
/// describe failures to reach or register a session.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The session's actor has stopped (the game is over).
    #[error("session {0} is no longer running")]
    Unavailable(SessionId),

    /// A live session already uses this id.
    #[error("session {0} is already registered")]
    AlreadyRegistered(SessionId),
}
